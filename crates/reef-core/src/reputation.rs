//! Reputation scoring for marketplace providers.
//!
//! Tracks a cumulative running average of client ratings per provider.

use serde::{Deserialize, Serialize};

use crate::Score;

/// Running-average trust score for a provider, always in `[0, 100]`.
///
/// New providers start at the neutral value 50. Each completed job folds the
/// client's rating into a cumulative integer mean, so the first recorded job
/// replaces the neutral value with the rating itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reputation {
    value: u8,
    jobs_scored: u64,
}

impl Reputation {
    /// Neutral starting value for new providers.
    pub const INITIAL: u8 = 50;

    /// Creates a reputation tracker at the neutral starting value.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: Self::INITIAL,
            jobs_scored: 0,
        }
    }

    /// Current reputation value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.value
    }

    /// Number of completed jobs folded into the average so far.
    #[must_use]
    pub const fn jobs_scored(&self) -> u64 {
        self.jobs_scored
    }

    /// Folds a rating into the running average and returns the new value.
    ///
    /// The update is `floor((value * (n - 1) + rating) / n)` where `n` counts
    /// this rating. Truncation happens at every step, so the stored value can
    /// drift below the exact mean of the ratings, but a weighted average of
    /// in-range inputs never leaves `[0, 100]`.
    pub fn record(&mut self, score: Score) -> u8 {
        self.jobs_scored = self.jobs_scored.saturating_add(1);
        let n = u128::from(self.jobs_scored);
        let weighted = u128::from(self.value) * (n - 1) + u128::from(score.value());
        self.value = (weighted / n) as u8;
        self.value
    }
}

impl Default for Reputation {
    fn default() -> Self {
        Self::new()
    }
}
