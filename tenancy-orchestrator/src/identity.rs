use serde::{Deserialize, Serialize};
use std::fmt;

/// Distinguished-name-like string identifying a tenant.
///
/// Passed through verbatim: no case folding, no reordering of RDNs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantIdentity(String);

impl TenantIdentity {
    /// Returns `None` for an empty or whitespace-only value.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
