//! Estimate values.
//!
//! A [`Point`] is what a participant plays: nothing yet, "no idea" (`?`),
//! "too big to estimate" (`∞`) or a number. The textual label is the only
//! wire and storage representation; [`Point::parse`] and [`Point::label`]
//! are inverse projections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PokerError;

/// Label of [`Point::Unknown`].
pub const UNKNOWN_LABEL: &str = "?";

/// Label of [`Point::Infinite`].
pub const INFINITE_LABEL: &str = "∞";

/// Numeric cards offered to clients, in display order.
pub const FIBONACCI_DECK: [i64; 10] = [1, 2, 3, 5, 8, 13, 21, 34, 55, 89];

/// A participant's estimate.
///
/// Compared by variant; numeric points compare by their label, so `"5"`
/// and `"05"` are different cards even though they carry the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Point {
    /// No card played. Label `""`.
    #[default]
    NotSet,
    /// The participant cannot estimate. Label `"?"`.
    Unknown,
    /// The item is too large to estimate. Label `"∞"`.
    Infinite,
    /// A numeric card.
    Numeric {
        /// Parsed value.
        value: i64,
        /// Label exactly as submitted.
        label: String,
    },
}

impl Point {
    /// Parses a card label.
    ///
    /// # Errors
    ///
    /// Returns [`PokerError::InvalidPointLabel`] if the label is not `""`,
    /// `"?"`, `"∞"` or a base-10 integer literal.
    pub fn parse(label: &str) -> Result<Self, PokerError> {
        match label {
            "" => Ok(Self::NotSet),
            UNKNOWN_LABEL => Ok(Self::Unknown),
            INFINITE_LABEL => Ok(Self::Infinite),
            other => other
                .parse::<i64>()
                .map(|value| Self::Numeric {
                    value,
                    label: other.to_string(),
                })
                .map_err(|_| PokerError::InvalidPointLabel(other.to_string())),
        }
    }

    /// Creates a numeric point with its canonical label.
    #[must_use]
    pub fn numeric(value: i64) -> Self {
        Self::Numeric {
            value,
            label: value.to_string(),
        }
    }

    /// Returns the wire label of this point.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::NotSet => "",
            Self::Unknown => UNKNOWN_LABEL,
            Self::Infinite => INFINITE_LABEL,
            Self::Numeric { label, .. } => label,
        }
    }

    /// Returns `true` once a card has been played.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::NotSet)
    }

    /// Returns the numeric value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<i64> {
        match self {
            Self::Numeric { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// Returns the card deck offered to clients: the Fibonacci cards followed
/// by `?` and `∞`.
#[must_use]
pub fn standard_deck() -> Vec<Point> {
    FIBONACCI_DECK
        .iter()
        .map(|value| Point::numeric(*value))
        .chain([Point::Unknown, Point::Infinite])
        .collect()
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Point {
    type Err = PokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Point {
    type Error = PokerError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::parse(&label)
    }
}

impl From<Point> for String {
    fn from(point: Point) -> Self {
        point.label().to_string()
    }
}
