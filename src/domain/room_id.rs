//! Type-safe room identifier.
//!
//! [`RoomId`] is a newtype wrapper around the externally chosen room name
//! (e.g. the URL fragment clients share), so room identifiers cannot be
//! confused with participant names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PokerError;

/// Maximum accepted length of a room identifier, in characters.
pub const MAX_ROOM_ID_LEN: usize = 128;

/// Identifier of a planning poker room.
///
/// Chosen by clients, not generated by the server. Used as the key of the
/// in-memory room cache, the durable document key and the `room` query
/// parameter of the WebSocket endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Creates a `RoomId` from a raw string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::InvalidRequest`] if the identifier is empty
    /// after trimming or longer than [`MAX_ROOM_ID_LEN`] characters.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PokerError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PokerError::InvalidRequest(
                "room id must not be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_ROOM_ID_LEN {
            return Err(PokerError::InvalidRequest(format!(
                "room id exceeds {MAX_ROOM_ID_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoomId {
    type Error = PokerError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        let Ok(id) = RoomId::new("  sprint-42 ") else {
            panic!("valid room id");
        };
        assert_eq!(id.as_str(), "sprint-42");
    }

    #[test]
    fn rejects_empty() {
        assert!(RoomId::new("").is_err());
        assert!(RoomId::new("   ").is_err());
    }

    #[test]
    fn rejects_oversize() {
        let long = "x".repeat(MAX_ROOM_ID_LEN + 1);
        assert!(RoomId::new(long).is_err());
        assert!(RoomId::new("x".repeat(MAX_ROOM_ID_LEN)).is_ok());
    }

    #[test]
    fn serde_round_trip() {
        let Ok(id) = RoomId::new("default") else {
            panic!("valid room id");
        };
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"default\"");
        let Ok(back) = serde_json::from_str::<RoomId>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, id);
    }

    #[test]
    fn deserialize_rejects_empty() {
        assert!(serde_json::from_str::<RoomId>("\"\"").is_err());
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let Ok(id) = RoomId::new("r1") else {
            panic!("valid room id");
        };
        let mut map = HashMap::new();
        map.insert(id.clone(), "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}
