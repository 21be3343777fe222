//! Error types for reef-market.

use reef_core::{CoreError, Principal};
use thiserror::Error;

use crate::job::{JobId, JobStatus};
use crate::resources::ResourceKind;

/// Errors that can occur in marketplace operations.
///
/// Every error is a synchronous rejection of the whole attempted operation;
/// no partial state change survives a failure.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Provider capacity dimension is zero.
    #[error("invalid capacity: {0} must be positive")]
    InvalidCapacity(ResourceKind),

    /// Hourly price is zero.
    #[error("invalid price: price per hour must be positive")]
    InvalidPrice,

    /// Caller already has an active provider registration.
    #[error("provider {0} is already registered and active")]
    AlreadyActive(Principal),

    /// Job requirement or duration is zero.
    #[error("invalid requirement: {0} must be positive")]
    InvalidRequirement(&'static str),

    /// No payment attached to a job posting.
    #[error("no payment attached to job posting")]
    NoPayment,

    /// Job id was never issued.
    #[error("invalid job id: {0}")]
    InvalidJobId(JobId),

    /// Caller is not the job's client.
    #[error("caller {caller} is not the client of job {job_id}")]
    NotClient {
        /// The job being operated on.
        job_id: JobId,
        /// The rejected caller.
        caller: Principal,
    },

    /// Job is not in the status the operation requires.
    #[error("job {job_id} is {actual}, expected {expected}")]
    WrongStatus {
        /// The job being operated on.
        job_id: JobId,
        /// Status the operation requires.
        expected: JobStatus,
        /// Status the job is actually in.
        actual: JobStatus,
    },

    /// Provider is not registered or has been deactivated.
    #[error("provider {0} is not active")]
    ProviderInactive(Principal),

    /// Caller is not the provider assigned to the job.
    #[error("caller {caller} is not the assigned provider of job {job_id}")]
    NotAssignedProvider {
        /// The job being operated on.
        job_id: JobId,
        /// The rejected caller.
        caller: Principal,
    },

    /// Provider capacity falls short of a job requirement.
    #[error("insufficient {resource}: required {required}, available {available}")]
    InsufficientCapacity {
        /// The dimension that falls short.
        resource: ResourceKind,
        /// Amount the job requires.
        required: u32,
        /// Amount the provider offers.
        available: u32,
    },

    /// Job payment has already been released.
    #[error("job {0} has already been paid")]
    AlreadyPaid(JobId),

    /// Reputation score outside `[1, 100]`.
    #[error("invalid reputation score: {0}")]
    InvalidReputationScore(u8),

    /// Caller is not the marketplace owner.
    #[error("caller {0} is not the marketplace owner")]
    NotOwner(Principal),

    /// Requested platform fee exceeds the cap.
    #[error("fee percentage {requested} exceeds cap of {cap}")]
    FeeAboveCap {
        /// Requested percentage.
        requested: u8,
        /// Maximum allowed percentage.
        cap: u8,
    },

    /// Value transfer rejected by the settlement boundary.
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// Escrow accounting violation.
    #[error("escrow error: {0}")]
    Escrow(String),
}

impl From<CoreError> for MarketError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidScore(value) => Self::InvalidReputationScore(value),
        }
    }
}
