//! Compute resource specifications.
//!
//! The same shape describes both what a provider offers and what a job
//! requires, so capacity checks are a per-dimension comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single resource dimension, used in capacity error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// CPU core count.
    CpuCores,
    /// RAM in gigabytes.
    RamGb,
    /// Storage in gigabytes.
    StorageGb,
}

impl ResourceKind {
    /// Returns the display name of this dimension.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CpuCores => "cpu cores",
            Self::RamGb => "ram gb",
            Self::StorageGb => "storage gb",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A compute resource specification: provider capacity or job requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// Number of CPU cores.
    pub cpu_cores: u32,
    /// RAM in gigabytes.
    pub ram_gb: u32,
    /// Storage in gigabytes.
    pub storage_gb: u32,
}

impl Resources {
    /// Creates a resource specification.
    #[must_use]
    pub const fn new(cpu_cores: u32, ram_gb: u32, storage_gb: u32) -> Self {
        Self {
            cpu_cores,
            ram_gb,
            storage_gb,
        }
    }

    /// Checks that every dimension of this capacity meets the requirement.
    #[must_use]
    pub const fn covers(&self, requirement: &Self) -> bool {
        self.cpu_cores >= requirement.cpu_cores
            && self.ram_gb >= requirement.ram_gb
            && self.storage_gb >= requirement.storage_gb
    }

    /// Returns the first dimension where this capacity falls short of the
    /// requirement, with (required, available) amounts.
    #[must_use]
    pub const fn first_shortfall(&self, requirement: &Self) -> Option<(ResourceKind, u32, u32)> {
        if self.cpu_cores < requirement.cpu_cores {
            return Some((ResourceKind::CpuCores, requirement.cpu_cores, self.cpu_cores));
        }
        if self.ram_gb < requirement.ram_gb {
            return Some((ResourceKind::RamGb, requirement.ram_gb, self.ram_gb));
        }
        if self.storage_gb < requirement.storage_gb {
            return Some((ResourceKind::StorageGb, requirement.storage_gb, self.storage_gb));
        }
        None
    }
}
