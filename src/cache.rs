//! Short-lived memoization of GET responses.
//!
//! Several views fetch overlapping data (the municipality distribution
//! feeds both the overview and the analytics view). Instead of ad hoc
//! per-view fetches, every GET goes through this cache, keyed by the
//! endpoint path plus query string, with a short TTL so a reload still
//! sees fresh data.
//!
//! Failures are never cached, and the manual retry action evicts a view's
//! keys before re-running its fetches, so a retry truly re-issues every
//! request.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;

/// Default entry lifetime. Long enough to dedupe the fetches of one
/// dashboard paint across views, short enough that a reload sees fresh
/// data.
const DEFAULT_TTL: Duration = Duration::from_secs(30);

type Entries = HashMap<String, (Instant, Value)>;

/// TTL cache for upstream JSON bodies, keyed by endpoint path + query.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<Entries>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    /// Create a cache with the given entry lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a fresh entry. Stale entries are dropped on the way out.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        if let Some((stored_at, value)) = entries.get(key) {
            if stored_at.elapsed() <= self.ttl {
                return Some(value.clone());
            }
        }
        entries.remove(key);
        None
    }

    /// Store a response body under its endpoint key.
    pub fn put(&self, key: &str, value: Value) {
        self.lock().insert(key.to_string(), (Instant::now(), value));
    }

    /// Drop every entry whose key starts with `prefix`. Used by the manual
    /// retry action so the re-run re-issues requests instead of replaying
    /// memoized bodies.
    pub fn evict_prefix(&self, prefix: &str) {
        self.lock().retain(|key, _| !key.starts_with(prefix));
    }
}
