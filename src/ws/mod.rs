//! WebSocket layer: connection handling, message routing, per-connection
//! session state.
//!
//! The WebSocket endpoint at `/ws?room=<id>` attaches a client to one room:
//! it sends intents (`get`, `join`, `estimate`, `reset`, `reveal`) and
//! receives participant and estimate views whenever the room changes.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod session;
