//! Repository layer: the cache-aside room store.
//!
//! [`RoomRepository`] serves rooms from an authoritative in-memory map and
//! falls back to a [`crate::persistence::RoomStore`] on a miss. Writes go
//! through to both.

pub mod room_repository;

pub use room_repository::{DEFAULT_ROOM_TTL_HOURS, RoomRepository};
