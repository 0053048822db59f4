//! Room views shared by the REST and WebSocket transports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Point, Room, RoomId, RoomState};

/// A participant as shown while cards are hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParticipantDto {
    /// Participant name.
    pub user_name: String,
    /// Whether the participant has played a card.
    pub is_estimated: bool,
}

/// A participant's revealed card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EstimateDto {
    /// Participant name.
    pub user_name: String,
    /// Card label; empty if no card was played.
    pub point: String,
}

/// Who is in the room and who has played, without revealing cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParticipantsView {
    /// Participants in join order.
    pub participants: Vec<ParticipantDto>,
    /// Round state (`"open"` or `"estimated"`).
    #[schema(value_type = String, example = "open")]
    pub state: RoomState,
}

impl From<&Room> for ParticipantsView {
    fn from(room: &Room) -> Self {
        Self {
            participants: room
                .estimates()
                .iter()
                .map(|e| ParticipantDto {
                    user_name: e.user.name.clone(),
                    is_estimated: e.point.is_set(),
                })
                .collect(),
            state: room.state(),
        }
    }
}

/// Every card in the room. Only produced once the room is revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EstimatesView {
    /// Cards in join order.
    pub estimates: Vec<EstimateDto>,
    /// When the cards were revealed.
    pub estimated_at: DateTime<Utc>,
}

impl EstimatesView {
    /// Builds the view, or `None` while the room is still open.
    #[must_use]
    pub fn from_room(room: &Room) -> Option<Self> {
        if room.state() != RoomState::Estimated {
            return None;
        }
        let estimated_at = room.last_revealed_at()?;
        Some(Self {
            estimates: estimate_dtos(room),
            estimated_at,
        })
    }
}

/// Response body for `GET /rooms/:id` and the room mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoomResponse {
    /// Room identifier.
    #[schema(value_type = String, example = "sprint-42")]
    pub room_id: RoomId,
    /// Round state.
    #[schema(value_type = String, example = "estimated")]
    pub state: RoomState,
    /// Participants in join order.
    pub participants: Vec<ParticipantDto>,
    /// Revealed cards; absent while the room is open.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub estimates: Option<Vec<EstimateDto>>,
    /// Time of the last reveal.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub revealed_at: Option<DateTime<Utc>>,
    /// Time of the last mutation.
    pub last_modified_at: DateTime<Utc>,
}

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        let view = ParticipantsView::from(room);
        let estimates = EstimatesView::from_room(room);
        Self {
            room_id: room.id().clone(),
            state: view.state,
            participants: view.participants,
            revealed_at: estimates.as_ref().map(|e| e.estimated_at),
            estimates: estimates.map(|e| e.estimates),
            last_modified_at: room.last_modified_at(),
        }
    }
}

/// A card of the deck offered to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CardDto {
    /// Card label as sent in `estimate` messages.
    pub label: String,
    /// Numeric value, absent for `?` and `∞`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<i64>,
}

impl From<&Point> for CardDto {
    fn from(point: &Point) -> Self {
        Self {
            label: point.label().to_string(),
            value: point.value(),
        }
    }
}

fn estimate_dtos(room: &Room) -> Vec<EstimateDto> {
    room.estimates()
        .iter()
        .map(|e| EstimateDto {
            user_name: e.user.name.clone(),
            point: e.point.label().to_string(),
        })
        .collect()
}
