//! The room aggregate.
//!
//! A [`Room`] owns its participants' estimates and the round state. All
//! mutators take `&mut self`, so the borrow checker serializes them: the
//! repository hands each transaction its own checked-out copy and
//! publishes it back on save.
//!
//! # State machine
//!
//! ```text
//!            reveal_estimates
//!   Open ───────────────────────▶ Estimated
//!    ▲                                │
//!    └────── set_estimate (first) ────┘
//!
//!   reset_estimates: self-loop on either state
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Estimate, Point, RoomId, User};
use crate::error::PokerError;

/// Round state of a room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomState {
    /// Cards are being played and stay hidden.
    #[default]
    Open,
    /// Cards have been revealed to everyone.
    Estimated,
}

impl RoomState {
    /// Returns the state as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Estimated => "estimated",
        }
    }
}

/// Aggregate for one estimation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    id: RoomId,
    state: RoomState,
    estimates: Vec<Estimate>,
    last_modified_at: DateTime<Utc>,
    last_revealed_at: Option<DateTime<Utc>>,
}

/// Serialized form of a [`Room`], used for durable storage.
///
/// Points are stored as their labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Room identifier.
    pub id: RoomId,
    /// Round state.
    pub state: RoomState,
    /// Estimates in join order.
    pub estimates: Vec<Estimate>,
    /// Timestamp of the last mutation.
    pub last_modified_at: DateTime<Utc>,
    /// Timestamp of the last reveal, if any.
    pub last_revealed_at: Option<DateTime<Utc>>,
}

impl Room {
    /// Creates an empty, open room.
    #[must_use]
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            state: RoomState::Open,
            estimates: Vec::new(),
            last_modified_at: Utc::now(),
            last_revealed_at: None,
        }
    }

    /// Returns the room identifier.
    #[must_use]
    pub const fn id(&self) -> &RoomId {
        &self.id
    }

    /// Returns the round state.
    #[must_use]
    pub const fn state(&self) -> RoomState {
        self.state
    }

    /// Returns the estimates in join order.
    #[must_use]
    pub fn estimates(&self) -> &[Estimate] {
        &self.estimates
    }

    /// Returns the timestamp of the last mutation.
    #[must_use]
    pub const fn last_modified_at(&self) -> DateTime<Utc> {
        self.last_modified_at
    }

    /// Returns the timestamp of the last reveal.
    #[must_use]
    pub const fn last_revealed_at(&self) -> Option<DateTime<Utc>> {
        self.last_revealed_at
    }

    /// Returns the estimate of the named participant.
    #[must_use]
    pub fn participant(&self, name: &str) -> Option<&Estimate> {
        self.estimates.iter().find(|e| e.user.name == name)
    }

    /// Returns the number of participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    /// Returns `true` if nobody has joined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// Adds a participant with no card played.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::UserAlreadyExists`] if the name is taken. The
    /// existing participant's activity timestamp is refreshed first, so
    /// callers treat this as "already joined".
    pub fn add_user(&mut self, name: &str) -> Result<(), PokerError> {
        let now = Utc::now();
        if let Some(existing) = self.estimates.iter_mut().find(|e| e.user.name == name) {
            existing.user.touch(now);
            return Err(PokerError::UserAlreadyExists(name.to_string()));
        }
        self.estimates.push(Estimate::unset(User::new(name, now)));
        self.touch(now);
        Ok(())
    }

    /// Removes a participant.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::UserNotFound`] if nobody has that name.
    pub fn remove_user(&mut self, name: &str) -> Result<(), PokerError> {
        let position = self
            .estimates
            .iter()
            .position(|e| e.user.name == name)
            .ok_or_else(|| PokerError::UserNotFound(name.to_string()))?;
        self.estimates.remove(position);
        self.touch(Utc::now());
        Ok(())
    }

    /// Plays a card for a participant.
    ///
    /// The first card played after a reveal starts a new round: every
    /// card is cleared, every participant is marked active and the room
    /// reopens before the new card is applied.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::UserNotFound`] if nobody has that name. The
    /// room is left untouched in that case.
    pub fn set_estimate(&mut self, name: &str, point: Point) -> Result<(), PokerError> {
        if self.participant(name).is_none() {
            return Err(PokerError::UserNotFound(name.to_string()));
        }
        let now = Utc::now();
        if self.state == RoomState::Estimated {
            for estimate in &mut self.estimates {
                estimate.point = Point::NotSet;
                estimate.user.touch(now);
            }
            self.state = RoomState::Open;
        }
        if let Some(estimate) = self.estimates.iter_mut().find(|e| e.user.name == name) {
            estimate.point = point;
            estimate.user.touch(now);
        }
        self.touch(now);
        Ok(())
    }

    /// Reveals all cards. Legal with no cards played.
    pub fn reveal_estimates(&mut self) {
        let revealed_at = self.touch(Utc::now());
        self.state = RoomState::Estimated;
        self.last_revealed_at = Some(revealed_at);
    }

    /// Clears every card. The round state is left as is.
    pub fn reset_estimates(&mut self) {
        for estimate in &mut self.estimates {
            estimate.point = Point::NotSet;
        }
        self.touch(Utc::now());
    }

    /// Projects the room to its serialized form.
    #[must_use]
    pub fn to_record(&self) -> RoomRecord {
        RoomRecord {
            id: self.id.clone(),
            state: self.state,
            estimates: self.estimates.clone(),
            last_modified_at: self.last_modified_at,
            last_revealed_at: self.last_revealed_at,
        }
    }

    /// Rebuilds a room from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::Internal`] if the record breaks a room
    /// invariant: a participant listed twice, or an estimated room that
    /// was never revealed.
    pub fn from_record(record: RoomRecord) -> Result<Self, PokerError> {
        for (i, estimate) in record.estimates.iter().enumerate() {
            let name = &estimate.user.name;
            if record
                .estimates
                .iter()
                .skip(i + 1)
                .any(|other| &other.user.name == name)
            {
                return Err(PokerError::Internal(format!(
                    "room {} lists participant {name} twice",
                    record.id
                )));
            }
        }
        if record.state == RoomState::Estimated && record.last_revealed_at.is_none() {
            return Err(PokerError::Internal(format!(
                "room {} is estimated but was never revealed",
                record.id
            )));
        }
        Ok(Self {
            id: record.id,
            state: record.state,
            estimates: record.estimates,
            last_modified_at: record.last_modified_at,
            last_revealed_at: record.last_revealed_at,
        })
    }

    /// Stamps a mutation and returns the stamp. Stamps strictly increase
    /// within one room, even if the wall clock stalls or steps back.
    fn touch(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let floor = self.last_modified_at + Duration::microseconds(1);
        self.last_modified_at = now.max(floor);
        self.last_modified_at
    }
}
