//! Label schema shared by every record this crate writes.
//!
//! The backing store has no columns, only labels (indexed, restricted
//! alphabet) and annotations (free-form). Lifecycle metadata lives in labels
//! so it can be selected on; the verbatim owner identity is additionally kept
//! in an annotation because distinguished names are rarely legal label values.

use crate::error::{OrchestratorError, Result};
use crate::identity::TenantIdentity;
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub const OWNER_DN: &str = "tenancy/ownerdn";
pub const CREATION_TIME: &str = "tenancy/creationtime";
pub const EXPIRATION_TIME: &str = "tenancy/expirationtime";
pub const USER_ID: &str = "tenancy/userid";
pub const DISPLAY_NAME: &str = "tenancy/displayname";
pub const CLUSTER_ID: &str = "tenancy/clusterid";
pub const PROJECT_ID: &str = "tenancy/projectid";

/// Timestamp layout used for every label. Colons are not legal in label
/// values, hence the dashes in the time part. Always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%SZ";

const MAX_LABEL_VALUE_LEN: usize = 63;
const HASHED_VALUE_PREFIX: &str = "dn-";
const HASHED_VALUE_HEX_LEN: usize = 40;

pub fn encode_timestamp(t: DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

pub fn decode_timestamp(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            OrchestratorError::MalformedMetadata(format!("bad timestamp '{}': {}", s, e))
        })
}

/// Current time at the resolution the label format can carry.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub fn is_valid_label_value(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    if s.len() > MAX_LABEL_VALUE_LEN {
        return false;
    }
    let bytes = s.as_bytes();
    let alnum_edges =
        bytes[0].is_ascii_alphanumeric() && bytes[bytes.len() - 1].is_ascii_alphanumeric();
    alnum_edges
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Maps an arbitrary string onto a legal label value.
///
/// Values that are already legal are kept as-is; anything else is replaced by
/// a stable digest so it can still be used in an equality selector.
pub fn encode_label_value(s: &str) -> String {
    if is_valid_label_value(s) {
        return s.to_string();
    }
    let digest = Sha256::digest(s.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}{}", HASHED_VALUE_PREFIX, &hex[..HASHED_VALUE_HEX_LEN])
}

/// Equality-only label selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    terms: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn owned_by(identity: &TenantIdentity) -> Self {
        Self::default().with(OWNER_DN, encode_label_value(identity.as_str()))
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, labels: Option<&BTreeMap<String, String>>) -> bool {
        self.terms
            .iter()
            .all(|(k, v)| labels.and_then(|l| l.get(k)) == Some(v))
    }

    /// `k1=v1,k2=v2` as accepted by the list API.
    pub fn to_query(&self) -> String {
        self.terms
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Ownership and lifetime of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    pub owner: TenantIdentity,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Lifecycle {
    pub fn starting_now(owner: TenantIdentity, ttl: chrono::Duration) -> Self {
        let created_at = now();
        Self {
            owner,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                OWNER_DN.to_string(),
                encode_label_value(self.owner.as_str()),
            ),
            (CREATION_TIME.to_string(), encode_timestamp(self.created_at)),
            (
                EXPIRATION_TIME.to_string(),
                encode_timestamp(self.expires_at),
            ),
        ])
    }

    pub fn annotations(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(OWNER_DN.to_string(), self.owner.as_str().to_string())])
    }

    /// Writes lifecycle labels and the owner annotation onto `meta`, keeping
    /// whatever else is already there.
    pub fn stamp(&self, meta: &mut ObjectMeta) {
        meta.labels.get_or_insert_with(BTreeMap::new).extend(self.labels());
        meta.annotations
            .get_or_insert_with(BTreeMap::new)
            .extend(self.annotations());
    }

    pub fn decode(meta: &ObjectMeta) -> Result<Self> {
        let owner = meta
            .annotations
            .as_ref()
            .and_then(|a| a.get(OWNER_DN))
            .and_then(|v| TenantIdentity::new(v.clone()))
            .ok_or_else(|| missing(meta, OWNER_DN))?;

        Ok(Self {
            owner,
            created_at: decode_timestamp(required_label(meta, CREATION_TIME)?)?,
            expires_at: decode_timestamp(required_label(meta, EXPIRATION_TIME)?)?,
        })
    }
}

pub fn required_label<'a>(meta: &'a ObjectMeta, key: &str) -> Result<&'a str> {
    meta.labels
        .as_ref()
        .and_then(|l| l.get(key))
        .map(String::as_str)
        .ok_or_else(|| missing(meta, key))
}

fn missing(meta: &ObjectMeta, key: &str) -> OrchestratorError {
    OrchestratorError::MalformedMetadata(format!(
        "{}: missing '{}'",
        meta.name.as_deref().unwrap_or("<unnamed>"),
        key
    ))
}
