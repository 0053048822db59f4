//! Domain layer: estimate values, participants and the room aggregate.
//!
//! This module contains the server-side domain model. Nothing here knows
//! about storage or transports; the repository and the session service
//! build on these types.

pub mod participant;
pub mod point;
pub mod room;
pub mod room_id;

pub use participant::{Estimate, User};
pub use point::{Point, standard_deck};
pub use room::{Room, RoomRecord, RoomState};
pub use room_id::RoomId;
