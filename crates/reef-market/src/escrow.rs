//! Per-job escrow accounting.
//!
//! Funds attached to a job posting are locked here until completion
//! releases them, making the "funds are held" contract auditable: the
//! vault total always equals the sum of `total_payment` over unpaid jobs.

use std::collections::HashMap;

use crate::error::MarketError;
use crate::job::JobId;

/// The ledger's escrow vault, keyed by job id.
#[derive(Debug, Clone, Default)]
pub struct EscrowVault {
    held: HashMap<JobId, u64>,
}

impl EscrowVault {
    /// Creates an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the payment attached to a job posting.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Escrow` if funds are already held for the job;
    /// job ids are never reused, so this indicates an accounting bug.
    pub fn lock(&mut self, job_id: JobId, amount: u64) -> Result<(), MarketError> {
        if self.held.contains_key(&job_id) {
            return Err(MarketError::Escrow(format!(
                "escrow already held for job {job_id}"
            )));
        }
        self.held.insert(job_id, amount);
        Ok(())
    }

    /// Releases and returns the funds held for a job.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Escrow` if no funds are held for the job.
    pub fn release(&mut self, job_id: JobId) -> Result<u64, MarketError> {
        self.held
            .remove(&job_id)
            .ok_or_else(|| MarketError::Escrow(format!("no escrow held for job {job_id}")))
    }

    /// Amount currently held for a job, if any.
    #[must_use]
    pub fn amount_for(&self, job_id: JobId) -> Option<u64> {
        self.held.get(&job_id).copied()
    }

    /// Sum of all currently held funds.
    #[must_use]
    pub fn total_held(&self) -> u64 {
        self.held.values().sum()
    }
}
