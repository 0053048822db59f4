//! Persistence layer: durable storage of room documents.
//!
//! The [`RoomStore`] trait is the boundary between the cache-aside
//! [`crate::repository::RoomRepository`] and whatever keeps rooms across
//! restarts. [`PostgresRoomStore`] uses `sqlx::PgPool`;
//! [`MemoryRoomStore`] keeps documents in process and backs tests and
//! deployments without a database.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

pub use memory::MemoryRoomStore;
pub use models::RoomDocument;
pub use postgres::PostgresRoomStore;

use crate::domain::RoomId;
use crate::error::PokerError;

/// Get/put storage for serialized rooms, keyed by room id.
///
/// Implementations translate "no such document" into `Ok(None)` and every
/// backend failure into [`PokerError::RepositoryUnavailable`].
#[async_trait]
pub trait RoomStore: Send + Sync + std::fmt::Debug {
    /// Loads the document for `room_id`, if one exists and has not expired.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::RepositoryUnavailable`] on backend failure or
    /// if the stored document cannot be decoded.
    async fn load(&self, room_id: &RoomId) -> Result<Option<RoomDocument>, PokerError>;

    /// Inserts or replaces the document for its room.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::RepositoryUnavailable`] on backend failure.
    async fn store(&self, document: &RoomDocument) -> Result<(), PokerError>;
}
