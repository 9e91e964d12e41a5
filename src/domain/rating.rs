use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A bake rating on a one to five scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// The lowest valid rating.
    pub const MIN: u8 = 1;
    /// The highest valid rating.
    pub const MAX: u8 = 5;

    /// Creates a rating.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRatingError`] if `value` is outside `1..=5`.
    pub const fn new(value: u8) -> Result<Self, InvalidRatingError> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(InvalidRatingError(value as i64))
        }
    }

    /// The numeric value of the rating.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl FromStr for Rating {
    type Err = InvalidRatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.trim().parse().map_err(|_| InvalidRatingError(0))?;
        u8::try_from(value)
            .map_err(|_| InvalidRatingError(value))
            .and_then(Self::new)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned for a rating outside the one to five scale.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("rating must be between 1 and 5 (got {0})")]
pub struct InvalidRatingError(i64);
