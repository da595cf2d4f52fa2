//! Deterministic cache key for gateway responses.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::role::Role;

/// SHA-256 digest over every field that influences a generation result.
///
/// Fields are length-prefixed and optionals carry a presence tag so that
/// adjacent values can never alias (e.g. prompt "ab"+system "c" vs prompt
/// "abc"+no system).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn compute(
        prompt: &str,
        role: Option<&Role>,
        temperature: f32,
        max_tokens: u32,
        system_prompt: Option<&str>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hash_str(&mut hasher, prompt);
        hash_opt_str(&mut hasher, role.map(|r| r.as_str()));
        hasher.update(temperature.to_bits().to_le_bytes());
        hasher.update(max_tokens.to_le_bytes());
        hash_opt_str(&mut hasher, system_prompt);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_opt_str(hasher: &mut Sha256, s: Option<&str>) {
    match s {
        Some(s) => {
            hasher.update([1u8]);
            hash_str(hasher, s);
        }
        None => hasher.update([0u8]),
    }
}
