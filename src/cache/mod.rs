//! Response cache
//!
//! TTL-keyed store of computed advisory responses with pattern-based
//! invalidation. Process-local and constructor-injected: a performance
//! optimization, never a source of truth. Expiry is checked lazily on
//! every get and swept eagerly by a periodic background pass.

use crate::models::{AdvisoryProfile, UserSelections};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const ADVICE_NAMESPACE: &str = "advice";
pub const DASHBOARD_NAMESPACE: &str = "dashboard";

/// One cached value with its expiry window
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub stored_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl CacheEntry {
    /// Expired once `now` is past `stored_at + ttl_seconds`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.stored_at);
        age.num_seconds() > self.ttl_seconds as i64
    }
}

/// In-memory TTL cache, safe under concurrent access.
///
/// Concurrent computations for the same key are not deduplicated;
/// the last writer wins.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a value, treating expired entries as absent (and removing them).
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Utc::now()).await
    }

    /// Expiry check against an explicit clock; `get` passes `Utc::now()`.
    pub async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    debug!(key, "Cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => {
                    debug!(key, "Cache miss");
                    return None;
                }
            }
        }

        // Entry was present but expired: evict lazily.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.is_expired(now) {
                entries.remove(key);
                debug!(key, "Cache entry expired");
            }
        }
        None
    }

    pub async fn set(&self, key: &str, value: Value, ttl_seconds: u64) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Utc::now(),
                ttl_seconds,
            },
        );
    }

    /// Remove an entry regardless of expiry (e.g. a corrupt payload).
    pub async fn evict(&self, key: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(key).is_some()
    }

    /// Delete all keys matching the pattern and return the count removed.
    /// A trailing `*` makes the pattern a prefix match; otherwise exact.
    pub async fn invalidate(&self, pattern: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();

        if let Some(prefix) = pattern.strip_suffix('*') {
            entries.retain(|key, _| !key.starts_with(prefix));
        } else {
            entries.remove(pattern);
        }

        let removed = before - entries.len();
        if removed > 0 {
            info!(pattern, removed, "Cache invalidated");
        }
        removed
    }

    /// Remove every expired entry; returns the count removed.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Cache sweep removed expired entries");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Spawn the periodic sweep task. A single interval timer keeps
    /// sweeps from overlapping; a delayed sweep runs next, not
    /// concurrently.
    pub fn spawn_sweeper(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.sweep().await;
            }
        })
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

//
// ================= Fingerprinting =================
//

/// Stable hash of the normalized request inputs, used as the cache-key
/// component that distinguishes requests for the same customer.
/// Streams JSON directly into the hasher (no intermediate String).
pub fn fingerprint(profile: &AdvisoryProfile, selections: &UserSelections) -> String {
    let mut hasher = Sha256::new();

    if serde_json::to_writer(&mut HashWriter(&mut hasher), &(profile, selections)).is_err() {
        return String::new();
    }

    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

/// `"{namespace}:{customer_id}:{fingerprint}"`
pub fn cache_key(namespace: &str, customer_id: &str, fingerprint: &str) -> String {
    format!("{}:{}:{}", namespace, customer_id, fingerprint)
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
