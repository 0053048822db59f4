//! Per-connection session state.
//!
//! Tracks which room a WebSocket client is attached to, the names it
//! joined under, and which reveal it has already been shown, and turns
//! observed room changes into the messages the client should receive.

use chrono::{DateTime, Utc};

use super::messages::ServerMessage;
use crate::domain::{Room, RoomId, RoomState};

/// State of a single WebSocket connection.
#[derive(Debug)]
pub struct ConnectionSession {
    room_id: RoomId,
    joined_as: Vec<String>,
    last_revealed_sent: Option<DateTime<Utc>>,
}

impl ConnectionSession {
    /// Creates the session of a connection attached to `room_id`.
    #[must_use]
    pub const fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            joined_as: Vec::new(),
            last_revealed_sent: None,
        }
    }

    /// Returns the room this connection is attached to.
    #[must_use]
    pub const fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Returns every name the connection joined under, in join order.
    #[must_use]
    pub fn joined_as(&self) -> &[String] {
        &self.joined_as
    }

    /// Records a successful join. Joining under another name keeps the
    /// earlier ones; all of them are left on disconnect.
    pub fn record_join(&mut self, user_name: &str) {
        if !self.joined_as.iter().any(|name| name == user_name) {
            self.joined_as.push(user_name.to_string());
        }
    }

    /// Records that the estimates of `room` were sent to the client.
    pub fn record_estimates_sent(&mut self, room: &Room) {
        self.last_revealed_sent = room.last_revealed_at();
    }

    /// Returns the messages to push after observing a changed room: the
    /// participants view, plus the estimates view the first time a given
    /// reveal is seen.
    pub fn messages_for_change(&mut self, room: &Room) -> Vec<ServerMessage> {
        let mut messages = vec![ServerMessage::participants(room)];
        if room.state() == RoomState::Estimated
            && room.last_revealed_at() != self.last_revealed_sent
            && let Some(estimates) = ServerMessage::estimates(room)
        {
            messages.push(estimates);
            self.record_estimates_sent(room);
        }
        messages
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Point;

    fn room() -> Room {
        let Ok(id) = RoomId::new("r1") else {
            panic!("valid room id");
        };
        let mut room = Room::new(id);
        if room.add_user("alice").is_err() {
            panic!("add_user failed");
        }
        room
    }

    fn types(messages: &[ServerMessage]) -> Vec<&'static str> {
        messages.iter().map(ServerMessage::type_str).collect()
    }

    #[test]
    fn open_room_sends_participants_only() {
        let room = room();
        let mut session = ConnectionSession::new(room.id().clone());
        assert_eq!(types(&session.messages_for_change(&room)), vec!["participants"]);
    }

    #[test]
    fn each_reveal_is_sent_once() {
        let mut room = room();
        let mut session = ConnectionSession::new(room.id().clone());

        room.reveal_estimates();
        assert_eq!(
            types(&session.messages_for_change(&room)),
            vec!["participants", "estimates"]
        );
        assert_eq!(types(&session.messages_for_change(&room)), vec!["participants"]);

        room.reveal_estimates();
        assert_eq!(
            types(&session.messages_for_change(&room)),
            vec!["participants", "estimates"]
        );
    }

    #[test]
    fn reveal_answered_directly_is_not_repeated() {
        let mut room = room();
        let mut session = ConnectionSession::new(room.id().clone());
        room.reveal_estimates();
        session.record_estimates_sent(&room);

        assert_eq!(types(&session.messages_for_change(&room)), vec!["participants"]);
    }

    #[test]
    fn new_round_goes_back_to_participants() {
        let mut room = room();
        let mut session = ConnectionSession::new(room.id().clone());
        room.reveal_estimates();
        let _ = session.messages_for_change(&room);

        if room.set_estimate("alice", Point::numeric(2)).is_err() {
            panic!("set_estimate failed");
        }
        assert_eq!(types(&session.messages_for_change(&room)), vec!["participants"]);
    }

    #[test]
    fn every_joined_name_is_kept() {
        let mut session = ConnectionSession::new(room().id().clone());
        assert!(session.joined_as().is_empty());

        session.record_join("alice");
        session.record_join("alice2");
        session.record_join("alice");
        assert_eq!(session.joined_as(), ["alice".to_string(), "alice2".to_string()]);
    }
}
