use std::str::FromStr;
use std::time::Duration;
use tenancy_orchestrator::{ids, IdStrategy, TenancyConfig};
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("invalid {name}='{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Where tenant records are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// The cluster's management API.
    #[default]
    Kube,
    /// Process memory; lost on restart. Local development only.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kube" | "kubernetes" => Ok(StoreBackend::Kube),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store '{}' (expected 'kube' or 'memory')", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub tenancy: TenancyConfig,
    pub store: StoreBackend,
    pub store_timeout: Duration,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let mut tenancy = TenancyConfig::new(
            required("CLUSTER_ID")?,
            required("AUTH_PROVIDER")?,
            required("DEFAULT_GLOBAL_ROLE")?,
            required("DEFAULT_PROJECT_ROLE")?,
        );
        if let Some(prefix) = get("TENANCY_ID_PREFIX") {
            if let Err(reason) = ids::check_prefix(&prefix) {
                return Err(ConfigError::Invalid {
                    name: "TENANCY_ID_PREFIX",
                    value: prefix,
                    reason,
                });
            }
            tenancy = tenancy.with_id_prefix(prefix);
        }
        if let Some(raw) = get("TENANCY_ID_STRATEGY") {
            let strategy = IdStrategy::from_str(&raw).map_err(|e| ConfigError::Invalid {
                name: "TENANCY_ID_STRATEGY",
                value: raw.clone(),
                reason: e.to_string(),
            })?;
            tenancy = tenancy.with_id_strategy(strategy);
        }

        let store = match get("TENANCY_STORE") {
            Some(raw) => raw.parse::<StoreBackend>().map_err(|reason| ConfigError::Invalid {
                name: "TENANCY_STORE",
                value: raw.clone(),
                reason,
            })?,
            None => StoreBackend::default(),
        };

        let store_timeout = match get("TENANCY_STORE_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "TENANCY_STORE_TIMEOUT_SECS",
                        value: raw,
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
        };

        let dry_run = match get("DRYRUN") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "DRYRUN",
                value: raw.clone(),
                reason: "expected true or false".to_string(),
            })?,
            None => false,
        };

        Ok(Self {
            bind_addr: get("TENANCY_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            tenancy,
            store,
            store_timeout,
            dry_run,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
