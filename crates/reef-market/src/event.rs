//! Audit events emitted by marketplace operations.
//!
//! Every mutating operation appends one or more events to the ledger's
//! audit log. Emission is a side effect for external indexers; events never
//! feed back into ledger state.

use chrono::{DateTime, Utc};
use reef_core::Principal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::job::JobId;

/// A marketplace notification event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A provider registered (or re-registered after deactivation).
    ProviderRegistered {
        /// The registered provider.
        provider: Principal,
        /// Offered CPU cores.
        cpu_cores: u32,
        /// Offered RAM in gigabytes.
        ram_gb: u32,
        /// Hourly price in the smallest currency unit.
        price_per_hour: u64,
    },

    /// A client posted a job and escrowed its payment.
    JobPosted {
        /// The new job's id.
        job_id: JobId,
        /// The posting client.
        client: Principal,
        /// Exact amount locked in escrow.
        total_payment: u64,
    },

    /// A client assigned a posted job to a provider.
    JobAssigned {
        /// The assigned job.
        job_id: JobId,
        /// The chosen provider.
        provider: Principal,
    },

    /// A job completed and its escrow was distributed.
    JobCompleted {
        /// The completed job.
        job_id: JobId,
        /// The provider that executed it.
        provider: Principal,
        /// Amount paid to the provider after the platform fee.
        provider_payment: u64,
    },

    /// Escrowed funds left the ledger for provider and owner.
    PaymentReleased {
        /// The settled job.
        job_id: JobId,
        /// The paid provider.
        provider: Principal,
        /// Amount paid to the provider after the platform fee.
        provider_payment: u64,
    },

    /// A provider's running-average reputation changed.
    ReputationUpdated {
        /// The rated provider.
        provider: Principal,
        /// Reputation value after the update.
        new_reputation: u8,
    },
}

impl MarketEvent {
    /// Returns the event type as a string.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProviderRegistered { .. } => "provider_registered",
            Self::JobPosted { .. } => "job_posted",
            Self::JobAssigned { .. } => "job_assigned",
            Self::JobCompleted { .. } => "job_completed",
            Self::PaymentReleased { .. } => "payment_released",
            Self::ReputationUpdated { .. } => "reputation_updated",
        }
    }
}

/// An audit-log entry: an event plus its emission metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique event identifier for external indexers.
    pub event_id: Uuid,
    /// The environment-supplied time of the emitting operation.
    pub timestamp: DateTime<Utc>,
    /// The event payload, flattened so the `type` tag sits at the top level.
    #[serde(flatten)]
    pub event: MarketEvent,
}

impl EventRecord {
    /// Stamps an event with a fresh id and the operation's timestamp.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, event: MarketEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp,
            event,
        }
    }

    /// Serializes the record to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
