//! Principal identities for marketplace participants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An authenticated identity used as the unique key for providers, clients,
/// and the marketplace owner.
///
/// Principals are minted by the hosting environment, which guarantees they
/// cannot be forged. The ledger treats them as opaque keys and never
/// fabricates one on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    /// Creates a principal from an environment-supplied identity.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
