//! Data Transfer Objects for REST and WebSocket serialization.
//!
//! Cards travel as their labels; the empty label means "no card".

pub mod room_dto;

pub use room_dto::*;
