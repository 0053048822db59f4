//! WebSocket message types: client intents and server views.

use serde::{Deserialize, Serialize};

use crate::api::dto::{EstimatesView, ParticipantsView};
use crate::domain::Room;

/// Intents a client can send over WebSocket.
///
/// ```json
/// {"type": "estimate", "user_name": "alice", "point": "5"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for the current participants view.
    Get,
    /// Join the connection's room.
    Join {
        /// Name to join under.
        user_name: String,
    },
    /// Play a card. The empty label withdraws the card.
    Estimate {
        /// Participant playing the card.
        user_name: String,
        /// Card label.
        #[serde(default)]
        point: String,
    },
    /// Clear every card.
    Reset,
    /// Reveal every card.
    Reveal,
}

/// Messages the server pushes to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Acknowledges a successful join.
    Joined {
        /// Name the connection joined under.
        user_name: String,
    },
    /// Who is in the room and who has played.
    Participants(ParticipantsView),
    /// Every card, sent once the room is revealed.
    Estimates(EstimatesView),
    /// A request failed.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

impl ServerMessage {
    /// Builds the participants view of a room.
    #[must_use]
    pub fn participants(room: &Room) -> Self {
        Self::Participants(ParticipantsView::from(room))
    }

    /// Builds the estimates view of a room, or `None` while it is open.
    #[must_use]
    pub fn estimates(room: &Room) -> Option<Self> {
        EstimatesView::from_room(room).map(Self::Estimates)
    }

    /// Builds an error message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns the message type as a static string slice.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "joined",
            Self::Participants(_) => "participants",
            Self::Estimates(_) => "estimates",
            Self::Error { .. } => "error",
        }
    }
}
