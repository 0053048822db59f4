//! PostgreSQL implementation of the room store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::RoomStore;
use super::models::RoomDocument;
use crate::domain::{RoomId, RoomRecord};
use crate::error::PokerError;

/// PostgreSQL-backed room store using `sqlx::PgPool`.
///
/// One row per room in the `rooms` table; the room itself is a JSONB
/// document and the expiry hint a separate indexed column.
#[derive(Debug, Clone)]
pub struct PostgresRoomStore {
    pool: PgPool,
}

impl PostgresRoomStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`PokerError::RepositoryUnavailable`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), PokerError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PokerError::RepositoryUnavailable(e.to_string()))
    }

    /// Deletes every room whose expiry hint has passed.
    ///
    /// # Errors
    ///
    /// Returns a [`PokerError::RepositoryUnavailable`] on database failure.
    pub async fn purge_expired(&self) -> Result<u64, PokerError> {
        let result = sqlx::query("DELETE FROM rooms WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RoomStore for PostgresRoomStore {
    async fn load(&self, room_id: &RoomId) -> Result<Option<RoomDocument>, PokerError> {
        let row = sqlx::query_as::<_, (serde_json::Value, DateTime<Utc>)>(
            "SELECT document, expires_at FROM rooms WHERE id = $1 AND expires_at > $2",
        )
        .bind(room_id.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let Some((document, expires_at)) = row else {
            return Ok(None);
        };
        let room: RoomRecord = serde_json::from_value(document).map_err(|e| {
            PokerError::RepositoryUnavailable(format!("corrupt document for room {room_id}: {e}"))
        })?;

        Ok(Some(RoomDocument::new(room, expires_at)))
    }

    async fn store(&self, document: &RoomDocument) -> Result<(), PokerError> {
        let json = serde_json::to_value(&document.room)
            .map_err(|e| PokerError::Internal(e.to_string()))?;

        sqlx::query(
            "INSERT INTO rooms (id, document, expires_at, updated_at) VALUES ($1, $2, $3, now()) \
             ON CONFLICT (id) DO UPDATE \
             SET document = EXCLUDED.document, expires_at = EXCLUDED.expires_at, updated_at = now()",
        )
        .bind(document.room_id().as_str())
        .bind(json)
        .bind(document.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
