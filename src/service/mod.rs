//! Service layer: business logic orchestration.
//!
//! [`SessionService`] runs the join / leave / estimate / reveal / reset use
//! cases as transactions against the [`crate::repository::RoomRepository`]
//! and hands out per-subscriber [`RoomChangeStream`]s.

pub mod change_stream;
pub mod session_service;

pub use change_stream::{ChangeDetector, ChangeStreamConfig, RoomChangeStream};
pub use session_service::SessionService;
