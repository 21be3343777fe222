//! Compute jobs and the job lifecycle state machine.

use chrono::{DateTime, Utc};
use reef_core::Principal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MarketError;
use crate::resources::Resources;

/// Identifier of a posted job.
///
/// Ids are issued sequentially starting at 1; id 0 is never valid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct JobId(u64);

impl JobId {
    /// Wraps a raw id value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The lifecycle status of a compute job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Posted by a client, awaiting assignment.
    Posted,
    /// Assigned to a provider, awaiting start.
    Assigned,
    /// Provider is executing the job.
    InProgress,
    /// Completed and paid (terminal).
    Completed,
    /// In dispute resolution (terminal; no operation transitions here yet).
    Disputed,
    /// Cancelled before execution (terminal; no operation transitions here yet).
    Cancelled,
}

impl JobStatus {
    /// Checks if a transition to the target status is valid.
    ///
    /// The live path is `Posted -> Assigned -> InProgress -> Completed`.
    /// `Disputed` and `Cancelled` are admitted for future dispute/cancel
    /// operations but nothing transitions into them today.
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        use JobStatus::{Assigned, Cancelled, Completed, Disputed, InProgress, Posted};

        matches!(
            (self, target),
            (Posted, Assigned)
                | (Assigned, InProgress)
                | (InProgress, Completed | Disputed)
                | (Posted | Assigned, Cancelled)
        )
    }

    /// Returns true if this status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Disputed | Self::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posted => write!(f, "Posted"),
            Self::Assigned => write!(f, "Assigned"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Completed => write!(f, "Completed"),
            Self::Disputed => write!(f, "Disputed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A compute job posted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeJob {
    /// Sequential job id.
    pub id: JobId,
    /// The posting client (immutable).
    pub client: Principal,
    /// The provider chosen at assignment, unset until then.
    pub assigned_provider: Option<Principal>,
    /// Opaque job description.
    pub description: String,
    /// Resource requirements the assigned provider must cover.
    pub requirements: Resources,
    /// Client's runtime estimate in hours.
    pub estimated_duration_hours: u32,
    /// Exact value escrowed at posting time (immutable).
    pub total_payment: u64,
    /// Set at assignment, overwritten when the provider starts.
    pub start_time: Option<DateTime<Utc>>,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// True exactly once payment has been distributed.
    pub payment_released: bool,
}

impl ComputeJob {
    /// Creates a freshly posted job.
    #[must_use]
    pub fn new(
        id: JobId,
        client: Principal,
        description: String,
        requirements: Resources,
        estimated_duration_hours: u32,
        total_payment: u64,
    ) -> Self {
        Self {
            id,
            client,
            assigned_provider: None,
            description,
            requirements,
            estimated_duration_hours,
            total_payment,
            start_time: None,
            status: JobStatus::Posted,
            payment_released: false,
        }
    }

    /// Attempts to move the job to a new status.
    pub(crate) fn transition_to(&mut self, target: JobStatus) -> Result<(), MarketError> {
        if self.status.can_transition_to(&target) {
            self.status = target;
            Ok(())
        } else {
            Err(MarketError::WrongStatus {
                job_id: self.id,
                expected: target,
                actual: self.status,
            })
        }
    }
}
