use crate::config::{IdStrategy, TenancyConfig};
use crate::identity::TenantIdentity;
use crate::store::ResourceKind;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub const TOKEN_LEN: usize = 5;
/// 120 bits of the digest, enough that distinct identities never share a name.
pub const DERIVED_TOKEN_LEN: usize = 24;
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const BASE32_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Produces record names of the form `<prefix>-<token>`.
///
/// Names are not checked for collisions up front; the store's create
/// conflict is the only uniqueness check.
pub trait IdGenerator: Send + Sync {
    fn generate(&self, kind: ResourceKind, identity: &TenantIdentity, cluster_id: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct RandomIds {
    prefix: String,
}

impl RandomIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl IdGenerator for RandomIds {
    fn generate(&self, _kind: ResourceKind, _identity: &TenantIdentity, _cluster_id: &str) -> String {
        let mut rng = rand::rng();
        let token: String = (0..TOKEN_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        format!("{}-{}", self.prefix, token)
    }
}

/// Same (kind, identity, cluster) always yields the same name: the prefix
/// plus the leading [`DERIVED_TOKEN_LEN`] base32 characters of a SHA-256
/// digest.
#[derive(Debug, Clone)]
pub struct DerivedIds {
    prefix: String,
}

impl DerivedIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl IdGenerator for DerivedIds {
    fn generate(&self, kind: ResourceKind, identity: &TenantIdentity, cluster_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(kind.to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(identity.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(cluster_id.as_bytes());
        let digest = hasher.finalize();

        format!("{}-{}", self.prefix, base32_token(&digest, DERIVED_TOKEN_LEN))
    }
}

/// Lowercase unpadded base32 of `bytes`, cut to `len` characters.
fn base32_token(bytes: &[u8], len: usize) -> String {
    let mut token = String::with_capacity(len);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    for byte in bytes {
        buffer = (buffer << 8) | u32::from(*byte);
        bits += 8;
        while bits >= 5 && token.len() < len {
            bits -= 5;
            token.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
        if token.len() == len {
            break;
        }
    }
    token
}

pub fn from_config(config: &TenancyConfig) -> Arc<dyn IdGenerator> {
    match config.id_strategy {
        IdStrategy::Random => Arc::new(RandomIds::new(config.id_prefix.clone())),
        IdStrategy::Derived => Arc::new(DerivedIds::new(config.id_prefix.clone())),
    }
}

/// Ids double as label values, so `<prefix>-<token>` must stay a valid
/// label of at most 63 characters whichever strategy is in use.
pub const MAX_PREFIX_LEN: usize = 63 - 1 - DERIVED_TOKEN_LEN;

/// Checks that `prefix` yields names the API server accepts: lowercase
/// alphanumerics and `-`, starting with an alphanumeric.
pub fn check_prefix(prefix: &str) -> Result<(), String> {
    let starts_alphanumeric = prefix
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    if !starts_alphanumeric {
        return Err("must start with a lowercase letter or digit".to_string());
    }
    if let Some(bad) = prefix
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(format!(
            "'{}' is not allowed; use lowercase letters, digits and '-'",
            bad
        ));
    }
    if prefix.len() > MAX_PREFIX_LEN {
        return Err(format!("longer than {} characters", MAX_PREFIX_LEN));
    }
    Ok(())
}

fn token_of<'a>(id: &'a str, prefix: &str) -> Option<&'a str> {
    id.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('-'))
}

/// True when `id` is a random id: `<prefix>-` followed by five lowercase
/// ASCII letters.
pub fn is_generated_id(id: &str, prefix: &str) -> bool {
    token_of(id, prefix).is_some_and(|token| {
        token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_lowercase())
    })
}

/// True when `id` has the shape [`DerivedIds`] produces.
pub fn is_derived_id(id: &str, prefix: &str) -> bool {
    token_of(id, prefix).is_some_and(|token| {
        token.len() == DERIVED_TOKEN_LEN && token.bytes().all(|b| BASE32_ALPHABET.contains(&b))
    })
}
