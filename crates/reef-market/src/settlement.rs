//! Settlement math and the value-transfer boundary.
//!
//! # Precision
//!
//! The fee split uses integer arithmetic only, with a `u128` intermediate so
//! no input combination can overflow. The platform fee is rounded DOWN
//! (floor), so the remainder and the rounding benefit go to the provider.
//! The two legs always sum to the escrowed total.

use reef_core::Principal;
use serde::{Deserialize, Serialize};

use crate::error::MarketError;
use crate::job::JobId;

/// The two legs of a settled payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    /// Amount owed to the provider.
    pub provider_amount: u64,
    /// Amount retained by the marketplace owner.
    pub platform_fee: u64,
}

/// Splits an escrowed payment between provider and platform.
///
/// `platform_fee = floor(total * fee_percentage / 100)`; the provider
/// receives the rest, so `provider_amount + platform_fee == total` always.
#[must_use]
pub const fn split_payment(total: u64, fee_percentage: u8) -> PaymentSplit {
    let fee = (total as u128 * fee_percentage as u128 / 100) as u64;
    PaymentSplit {
        provider_amount: total - fee,
        platform_fee: fee,
    }
}

/// A settlement instruction: where the escrowed funds of a job must go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// The job being settled.
    pub job_id: JobId,
    /// The provider receiving the payment leg.
    pub provider: Principal,
    /// Amount transferred to the provider.
    pub provider_amount: u64,
    /// The owner receiving the fee leg.
    pub owner: Principal,
    /// Amount transferred to the owner.
    pub platform_fee: u64,
}

impl Payout {
    /// Total value moved by this payout.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.provider_amount + self.platform_fee
    }
}

/// The environment's value-transfer boundary.
///
/// Implementations must apply BOTH legs of the payout or neither; returning
/// an error means no funds moved. The ledger calls this before mutating any
/// of its own state, so a rejected transfer leaves the whole operation
/// without effect.
pub trait SettlementSink {
    /// Applies both legs of a settlement atomically.
    fn settle(&mut self, payout: &Payout) -> Result<(), MarketError>;
}

/// In-memory settlement sink crediting per-principal balances.
///
/// Stands in for the hosting environment's real transfer mechanism; tests
/// use it to audit fund conservation end to end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Treasury {
    balances: std::collections::HashMap<Principal, u64>,
}

impl Treasury {
    /// Creates an empty treasury.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance of a principal.
    #[must_use]
    pub fn balance(&self, principal: &Principal) -> u64 {
        self.balances.get(principal).copied().unwrap_or(0)
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.balances.values().sum()
    }

    fn credit(&mut self, principal: &Principal, amount: u64) {
        *self.balances.entry(principal.clone()).or_insert(0) += amount;
    }
}

impl SettlementSink for Treasury {
    fn settle(&mut self, payout: &Payout) -> Result<(), MarketError> {
        self.credit(&payout.provider, payout.provider_amount);
        self.credit(&payout.owner, payout.platform_fee);
        Ok(())
    }
}
