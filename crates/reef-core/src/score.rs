//! Validated job rating scores.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CoreError;

/// A job rating submitted by a client at completion time.
///
/// Ratings are integers in `[1, 100]`; construction rejects anything
/// outside that range so downstream reputation math never sees an
/// out-of-range input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score(u8);

impl Score {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;

    /// Highest accepted rating.
    pub const MAX: u8 = 100;

    /// Creates a score from a raw rating.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidScore` if the value is outside `[1, 100]`.
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(CoreError::InvalidScore(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw rating value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
