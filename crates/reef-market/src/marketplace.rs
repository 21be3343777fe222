//! The marketplace ledger.
//!
//! A single state-owning service holding the provider registry, job table,
//! escrow vault, and audit log. Every operation is a synchronous, atomic
//! state transition: preconditions are checked before any mutation, and a
//! failure leaves the ledger untouched. Exclusive access comes from
//! `&mut self`; callers embedding the ledger in a concurrent service must
//! wrap the whole value in a lock to keep transitions serialized.

use chrono::{DateTime, Utc};
use reef_core::{Principal, Score};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::error::MarketError;
use crate::escrow::EscrowVault;
use crate::event::{EventRecord, MarketEvent};
use crate::job::{ComputeJob, JobId, JobStatus};
use crate::provider::Provider;
use crate::resources::{ResourceKind, Resources};
use crate::settlement::{split_payment, Payout, SettlementSink};

/// Receipt returned by a successful job completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    /// The settled job.
    pub job_id: JobId,
    /// The provider that was paid.
    pub provider: Principal,
    /// Amount transferred to the provider.
    pub provider_payment: u64,
    /// Amount retained by the marketplace owner.
    pub platform_fee: u64,
    /// The provider's reputation after folding in the client's rating.
    pub new_reputation: u8,
}

/// The authoritative ledger of providers, jobs, and payments.
#[derive(Debug)]
pub struct Marketplace {
    owner: Principal,
    fee_percentage: u8,
    providers: HashMap<Principal, Provider>,
    active_providers: Vec<Principal>,
    jobs: HashMap<JobId, ComputeJob>,
    next_job_id: u64,
    client_jobs: HashMap<Principal, Vec<JobId>>,
    provider_jobs: HashMap<Principal, Vec<JobId>>,
    escrow: EscrowVault,
    audit: Vec<EventRecord>,
}

impl Marketplace {
    /// Platform fee percentage at deployment.
    pub const INITIAL_FEE_PERCENTAGE: u8 = 5;

    /// Upper bound the owner can raise the fee to.
    pub const FEE_CAP_PERCENTAGE: u8 = 10;

    /// Creates an empty marketplace owned by the given principal.
    #[must_use]
    pub fn new(owner: Principal) -> Self {
        Self {
            owner,
            fee_percentage: Self::INITIAL_FEE_PERCENTAGE,
            providers: HashMap::new(),
            active_providers: Vec::new(),
            jobs: HashMap::new(),
            next_job_id: 1,
            client_jobs: HashMap::new(),
            provider_jobs: HashMap::new(),
            escrow: EscrowVault::new(),
            audit: Vec::new(),
        }
    }

    // =========================================================================
    // Provider registry
    // =========================================================================

    /// Registers the caller as a compute provider.
    ///
    /// A previously deactivated principal may re-register; this overwrites
    /// the old record with a fresh one (neutral reputation, zeroed counters)
    /// and appends a second entry to the active-provider listing, which is
    /// append-only and never pruned.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` if any capacity dimension is zero, `InvalidPrice`
    /// if the hourly price is zero, `AlreadyActive` if the caller already
    /// has an active registration.
    pub fn register_provider(
        &mut self,
        caller: &Principal,
        endpoint: impl Into<String>,
        capacity: Resources,
        price_per_hour: u64,
        now: DateTime<Utc>,
    ) -> Result<(), MarketError> {
        if capacity.cpu_cores == 0 {
            return Err(MarketError::InvalidCapacity(ResourceKind::CpuCores));
        }
        if capacity.ram_gb == 0 {
            return Err(MarketError::InvalidCapacity(ResourceKind::RamGb));
        }
        if capacity.storage_gb == 0 {
            return Err(MarketError::InvalidCapacity(ResourceKind::StorageGb));
        }
        if price_per_hour == 0 {
            return Err(MarketError::InvalidPrice);
        }
        if self.providers.get(caller).is_some_and(|p| p.is_active) {
            return Err(MarketError::AlreadyActive(caller.clone()));
        }

        let provider = Provider::new(caller.clone(), endpoint.into(), capacity, price_per_hour);
        self.providers.insert(caller.clone(), provider);
        self.active_providers.push(caller.clone());

        self.emit(
            now,
            MarketEvent::ProviderRegistered {
                provider: caller.clone(),
                cpu_cores: capacity.cpu_cores,
                ram_gb: capacity.ram_gb,
                price_per_hour,
            },
        );
        info!(provider = %caller, price_per_hour, "provider registered");
        Ok(())
    }

    /// Deactivates a provider. Owner only.
    ///
    /// The record stays in place with `is_active` false; the active-provider
    /// listing is not pruned and jobs already assigned to the provider keep
    /// running. Deactivating a never-registered principal is a no-op.
    ///
    /// # Errors
    ///
    /// `NotOwner` if the caller is not the marketplace owner.
    pub fn deactivate_provider(
        &mut self,
        caller: &Principal,
        provider: &Principal,
    ) -> Result<(), MarketError> {
        if *caller != self.owner {
            return Err(MarketError::NotOwner(caller.clone()));
        }
        if let Some(record) = self.providers.get_mut(provider) {
            record.is_active = false;
            info!(provider = %provider, "provider deactivated");
        }
        Ok(())
    }

    // =========================================================================
    // Job lifecycle
    // =========================================================================

    /// Posts a job, locking the attached payment in escrow.
    ///
    /// Returns the newly issued job id. Ids are issued sequentially
    /// starting at 1. The storage requirement is intentionally accepted at
    /// zero; cpu, ram, and duration must be positive.
    ///
    /// # Errors
    ///
    /// `InvalidRequirement` for a zero cpu, ram, or duration;
    /// `NoPayment` if no value is attached.
    pub fn post_job(
        &mut self,
        caller: &Principal,
        description: impl Into<String>,
        requirements: Resources,
        estimated_duration_hours: u32,
        payment: u64,
        now: DateTime<Utc>,
    ) -> Result<JobId, MarketError> {
        if requirements.cpu_cores == 0 {
            return Err(MarketError::InvalidRequirement("cpu cores"));
        }
        if requirements.ram_gb == 0 {
            return Err(MarketError::InvalidRequirement("ram gb"));
        }
        if estimated_duration_hours == 0 {
            return Err(MarketError::InvalidRequirement("duration hours"));
        }
        if payment == 0 {
            return Err(MarketError::NoPayment);
        }

        let id = JobId::new(self.next_job_id);
        self.next_job_id += 1;

        let job = ComputeJob::new(
            id,
            caller.clone(),
            description.into(),
            requirements,
            estimated_duration_hours,
            payment,
        );
        self.escrow.lock(id, payment)?;
        self.jobs.insert(id, job);
        self.client_jobs.entry(caller.clone()).or_default().push(id);

        self.emit(
            now,
            MarketEvent::JobPosted {
                job_id: id,
                client: caller.clone(),
                total_payment: payment,
            },
        );
        info!(job_id = %id, client = %caller, payment, "job posted");
        Ok(id)
    }

    /// Assigns a posted job to a provider chosen by the client.
    ///
    /// Assignment is manual: the client picks the provider, and the ledger
    /// only re-verifies capacity as a safety check.
    ///
    /// # Errors
    ///
    /// `InvalidJobId`, `NotClient`, `WrongStatus`, `ProviderInactive`, or
    /// `InsufficientCapacity` (naming the first short dimension).
    pub fn assign_job(
        &mut self,
        caller: &Principal,
        job_id: JobId,
        provider: &Principal,
        now: DateTime<Utc>,
    ) -> Result<(), MarketError> {
        let job = self
            .jobs
            .get(&job_id)
            .ok_or(MarketError::InvalidJobId(job_id))?;
        if job.client != *caller {
            return Err(MarketError::NotClient {
                job_id,
                caller: caller.clone(),
            });
        }
        if job.status != JobStatus::Posted {
            return Err(MarketError::WrongStatus {
                job_id,
                expected: JobStatus::Posted,
                actual: job.status,
            });
        }
        let record = self
            .providers
            .get(provider)
            .filter(|p| p.is_active)
            .ok_or_else(|| MarketError::ProviderInactive(provider.clone()))?;
        if let Some((resource, required, available)) =
            record.capacity.first_shortfall(&job.requirements)
        {
            return Err(MarketError::InsufficientCapacity {
                resource,
                required,
                available,
            });
        }

        let job = self
            .jobs
            .get_mut(&job_id)
            .ok_or(MarketError::InvalidJobId(job_id))?;
        job.assigned_provider = Some(provider.clone());
        job.transition_to(JobStatus::Assigned)?;
        job.start_time = Some(now);
        self.provider_jobs
            .entry(provider.clone())
            .or_default()
            .push(job_id);

        self.emit(
            now,
            MarketEvent::JobAssigned {
                job_id,
                provider: provider.clone(),
            },
        );
        info!(job_id = %job_id, provider = %provider, "job assigned");
        Ok(())
    }

    /// Marks an assigned job as started. Caller must be the assigned,
    /// still-active provider.
    ///
    /// Overwrites the assignment-time `start_time` with the actual start.
    ///
    /// # Errors
    ///
    /// `InvalidJobId`, `ProviderInactive`, `NotAssignedProvider`, or
    /// `WrongStatus`.
    pub fn start_job(
        &mut self,
        caller: &Principal,
        job_id: JobId,
        now: DateTime<Utc>,
    ) -> Result<(), MarketError> {
        if !self.jobs.contains_key(&job_id) {
            return Err(MarketError::InvalidJobId(job_id));
        }
        if !self.providers.get(caller).is_some_and(|p| p.is_active) {
            return Err(MarketError::ProviderInactive(caller.clone()));
        }

        let job = self
            .jobs
            .get_mut(&job_id)
            .ok_or(MarketError::InvalidJobId(job_id))?;
        if job.assigned_provider.as_ref() != Some(caller) {
            return Err(MarketError::NotAssignedProvider {
                job_id,
                caller: caller.clone(),
            });
        }
        if job.status != JobStatus::Assigned {
            return Err(MarketError::WrongStatus {
                job_id,
                expected: JobStatus::Assigned,
                actual: job.status,
            });
        }

        job.transition_to(JobStatus::InProgress)?;
        job.start_time = Some(now);
        info!(job_id = %job_id, provider = %caller, "job started");
        Ok(())
    }

    /// Completes an in-progress job as one atomic step: rates the provider,
    /// releases the escrowed payment through the settlement sink, and
    /// updates provider stats.
    ///
    /// The sink is invoked after every precondition passes and before any
    /// ledger state changes, so a rejected transfer aborts the whole
    /// operation with the ledger unchanged.
    ///
    /// # Errors
    ///
    /// `InvalidJobId`, `NotClient`, `WrongStatus`, `AlreadyPaid`,
    /// `InvalidReputationScore`, or `Transfer` if the sink rejects the
    /// payout.
    pub fn complete_job_and_pay<S: SettlementSink>(
        &mut self,
        caller: &Principal,
        job_id: JobId,
        rating: u8,
        now: DateTime<Utc>,
        sink: &mut S,
    ) -> Result<SettlementReceipt, MarketError> {
        let job = self
            .jobs
            .get(&job_id)
            .ok_or(MarketError::InvalidJobId(job_id))?;
        if job.client != *caller {
            return Err(MarketError::NotClient {
                job_id,
                caller: caller.clone(),
            });
        }
        if job.payment_released {
            return Err(MarketError::AlreadyPaid(job_id));
        }
        if job.status != JobStatus::InProgress {
            return Err(MarketError::WrongStatus {
                job_id,
                expected: JobStatus::InProgress,
                actual: job.status,
            });
        }
        let score = Score::new(rating)?;
        let provider = job
            .assigned_provider
            .clone()
            .ok_or_else(|| MarketError::Escrow(format!("job {job_id} in progress without provider")))?;
        if self.escrow.amount_for(job_id) != Some(job.total_payment) {
            return Err(MarketError::Escrow(format!(
                "escrow does not match total payment for job {job_id}"
            )));
        }

        let split = split_payment(job.total_payment, self.fee_percentage);
        let payout = Payout {
            job_id,
            provider: provider.clone(),
            provider_amount: split.provider_amount,
            owner: self.owner.clone(),
            platform_fee: split.platform_fee,
        };

        // Value transfer first: if either leg is rejected the ledger has not
        // been touched yet and the operation fails clean.
        sink.settle(&payout)?;

        self.escrow.release(job_id)?;
        let job = self
            .jobs
            .get_mut(&job_id)
            .ok_or(MarketError::InvalidJobId(job_id))?;
        job.transition_to(JobStatus::Completed)?;
        job.payment_released = true;

        let record = self
            .providers
            .get_mut(&provider)
            .ok_or_else(|| MarketError::Escrow(format!("assigned provider {provider} missing")))?;
        record.total_earnings += split.provider_amount;
        let new_reputation = record.reputation.record(score);

        self.emit(
            now,
            MarketEvent::JobCompleted {
                job_id,
                provider: provider.clone(),
                provider_payment: split.provider_amount,
            },
        );
        self.emit(
            now,
            MarketEvent::PaymentReleased {
                job_id,
                provider: provider.clone(),
                provider_payment: split.provider_amount,
            },
        );
        self.emit(
            now,
            MarketEvent::ReputationUpdated {
                provider: provider.clone(),
                new_reputation,
            },
        );
        info!(
            job_id = %job_id,
            provider = %provider,
            provider_payment = split.provider_amount,
            platform_fee = split.platform_fee,
            new_reputation,
            "job completed and paid"
        );

        Ok(SettlementReceipt {
            job_id,
            provider,
            provider_payment: split.provider_amount,
            platform_fee: split.platform_fee,
            new_reputation,
        })
    }

    // =========================================================================
    // Platform configuration
    // =========================================================================

    /// Updates the platform fee percentage. Owner only; capped at 10.
    ///
    /// # Errors
    ///
    /// `NotOwner` or `FeeAboveCap`. On failure the fee keeps its prior value.
    pub fn update_platform_fee(
        &mut self,
        caller: &Principal,
        new_percentage: u8,
    ) -> Result<(), MarketError> {
        if *caller != self.owner {
            return Err(MarketError::NotOwner(caller.clone()));
        }
        if new_percentage > Self::FEE_CAP_PERCENTAGE {
            return Err(MarketError::FeeAboveCap {
                requested: new_percentage,
                cap: Self::FEE_CAP_PERCENTAGE,
            });
        }
        self.fee_percentage = new_percentage;
        info!(fee_percentage = new_percentage, "platform fee updated");
        Ok(())
    }

    // =========================================================================
    // Read-only queries
    // =========================================================================

    /// The marketplace owner.
    #[must_use]
    pub const fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Current platform fee percentage.
    #[must_use]
    pub const fn fee_percentage(&self) -> u8 {
        self.fee_percentage
    }

    /// Looks up a provider record.
    #[must_use]
    pub fn provider(&self, principal: &Principal) -> Option<&Provider> {
        self.providers.get(principal)
    }

    /// Looks up a job.
    ///
    /// # Errors
    ///
    /// `InvalidJobId` for ids never issued (including 0 and anything at or
    /// beyond the next-id counter).
    pub fn job(&self, job_id: JobId) -> Result<&ComputeJob, MarketError> {
        self.jobs
            .get(&job_id)
            .ok_or(MarketError::InvalidJobId(job_id))
    }

    /// Snapshot of the active-provider listing.
    ///
    /// Entries are appended at registration and never pruned: a deactivated
    /// provider stays listed, and a principal that re-registers after
    /// deactivation appears twice.
    #[must_use]
    pub fn active_providers(&self) -> &[Principal] {
        &self.active_providers
    }

    /// Jobs posted by a client, in posting order.
    #[must_use]
    pub fn client_jobs(&self, client: &Principal) -> &[JobId] {
        self.client_jobs.get(client).map_or(&[], Vec::as_slice)
    }

    /// Jobs assigned to a provider, in assignment order.
    #[must_use]
    pub fn provider_jobs(&self, provider: &Principal) -> &[JobId] {
        self.provider_jobs.get(provider).map_or(&[], Vec::as_slice)
    }

    /// Number of jobs ever posted.
    #[must_use]
    pub const fn job_count(&self) -> u64 {
        self.next_job_id - 1
    }

    /// Sum of funds currently locked in escrow. Always equals the sum of
    /// `total_payment` over jobs whose payment has not been released.
    #[must_use]
    pub fn escrow_total(&self) -> u64 {
        self.escrow.total_held()
    }

    /// Audit-trail snapshot, oldest first.
    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        &self.audit
    }

    fn emit(&mut self, now: DateTime<Utc>, event: MarketEvent) {
        self.audit.push(EventRecord::new(now, event));
    }
}
