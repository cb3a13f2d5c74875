//! Persisted cache entry

use serde::{Deserialize, Serialize};

/// One cached value and the instant it stops being valid
///
/// Serialized as the two-element array `[expires_at, value]`, where
/// `expires_at` is whole epoch seconds or `null` for "never".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry(pub Option<i64>, pub serde_json::Value);

impl CacheEntry {
    /// Build an entry that expires `ttl_secs` after `now`
    pub fn new(value: serde_json::Value, ttl_secs: Option<u64>, now: i64) -> Self {
        let expires_at = ttl_secs.map(|ttl| now.saturating_add(i64::try_from(ttl).unwrap_or(i64::MAX)));
        Self(expires_at, value)
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.0
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.1
    }

    pub fn into_value(self) -> serde_json::Value {
        self.1
    }

    /// An entry is stale once its expiry instant has been reached
    pub fn is_expired(&self, now: i64) -> bool {
        match self.0 {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }
}
