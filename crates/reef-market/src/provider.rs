//! Provider records for the marketplace registry.

use reef_core::{Principal, Reputation};
use serde::{Deserialize, Serialize};

use crate::resources::Resources;

/// A registered compute provider.
///
/// One record exists per registered principal. Records are never deleted:
/// deactivation flips `is_active`, and re-registration after deactivation
/// overwrites the record with a fresh one (neutral reputation, zeroed
/// counters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// The provider's principal identity (immutable after registration).
    pub address: Principal,
    /// Opaque connection string; not validated by the ledger.
    pub endpoint: String,
    /// Offered capacity, each dimension positive at registration.
    pub capacity: Resources,
    /// Hourly price in the smallest currency unit.
    pub price_per_hour: u64,
    /// False after deactivation by the owner.
    pub is_active: bool,
    /// Running-average trust score, starts at 50.
    pub reputation: Reputation,
    /// Total amount earned from completed jobs (monotonically non-decreasing).
    pub total_earnings: u64,
}

impl Provider {
    /// Creates a fresh, active provider record with neutral reputation.
    #[must_use]
    pub fn new(
        address: Principal,
        endpoint: String,
        capacity: Resources,
        price_per_hour: u64,
    ) -> Self {
        Self {
            address,
            endpoint,
            capacity,
            price_per_hour,
            is_active: true,
            reputation: Reputation::new(),
            total_earnings: 0,
        }
    }

    /// Number of jobs this provider has completed.
    #[must_use]
    pub const fn total_jobs_completed(&self) -> u64 {
        self.reputation.jobs_scored()
    }
}
