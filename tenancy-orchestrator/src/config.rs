use crate::error::OrchestratorError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_ID_PREFIX: &str = "tenancy";

/// How generated resource names are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Fresh random token per create.
    #[default]
    Random,
    /// Token derived from the identity, so a second create for the same
    /// identity collides on name in the backing store.
    Derived,
}

impl FromStr for IdStrategy {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(IdStrategy::Random),
            "derived" => Ok(IdStrategy::Derived),
            other => Err(OrchestratorError::InvalidInput(format!(
                "unknown id strategy '{}' (expected 'random' or 'derived')",
                other
            ))),
        }
    }
}

/// Settings the orchestrator is constructed with. Never re-read at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyConfig {
    pub cluster_id: String,
    pub auth_provider: String,
    pub default_global_role: String,
    pub default_workspace_role: String,
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

fn default_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_string()
}

impl TenancyConfig {
    pub fn new(
        cluster_id: impl Into<String>,
        auth_provider: impl Into<String>,
        default_global_role: impl Into<String>,
        default_workspace_role: impl Into<String>,
    ) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            auth_provider: auth_provider.into(),
            default_global_role: default_global_role.into(),
            default_workspace_role: default_workspace_role.into(),
            id_prefix: default_id_prefix(),
            id_strategy: IdStrategy::default(),
        }
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }
}
