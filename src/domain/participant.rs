//! Participants and their estimates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Point;

/// A participant of a room. The name is unique within the room and acts
/// as the participant's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name, unique per room.
    pub name: String,
    /// Last time the participant joined or played a card.
    pub last_activity_at: DateTime<Utc>,
}

impl User {
    /// Creates a participant whose activity timestamp is `at`.
    #[must_use]
    pub fn new(name: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            last_activity_at: at,
        }
    }

    /// Marks the participant as active at `at`.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_activity_at = at;
    }
}

/// One participant's current card. Owned by the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    /// The participant.
    pub user: User,
    /// The card played, [`Point::NotSet`] until one is chosen.
    pub point: Point,
}

impl Estimate {
    /// Creates an estimate with no card played yet.
    #[must_use]
    pub fn unset(user: User) -> Self {
        Self {
            user,
            point: Point::NotSet,
        }
    }
}
