//! Database models for stored rooms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{RoomId, RoomRecord};

/// A room as written to durable storage, with its expiry hint.
///
/// The backing store may drop the document once `expires_at` has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDocument {
    /// Serialized room.
    #[serde(flatten)]
    pub room: RoomRecord,
    /// Time after which the document may be garbage-collected.
    pub expires_at: DateTime<Utc>,
}

impl RoomDocument {
    /// Wraps a room record with its expiry hint.
    #[must_use]
    pub const fn new(room: RoomRecord, expires_at: DateTime<Utc>) -> Self {
        Self { room, expires_at }
    }

    /// Returns the document key.
    #[must_use]
    pub const fn room_id(&self) -> &RoomId {
        &self.room.id
    }

    /// Returns `true` if the document is past its expiry hint at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
