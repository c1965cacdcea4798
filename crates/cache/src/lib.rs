//! Shared TTL cache backing both resolver namespaces.
//!
//! Uses `DashMap` so single-key operations stay atomic under concurrent
//! resolver calls. The read-fetch-write sequence around the cache is not
//! locked: concurrent misses on one key each perform the full fetch and
//! overwrite the same entry.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// TTL sentinel for a key that is absent or already expired.
pub const TTL_ABSENT: i64 = -2;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Thread-safe key/value store with per-key expiry.
///
/// Cloning is cheap and every clone shares the same entries; resolvers
/// receive a handle at construction rather than reaching for a global.
#[derive(Debug, Clone, Default)]
pub struct TtlCache {
    entries: Arc<DashMap<String, Entry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Fetch a live value. Expired entries count as absent and are
    /// dropped on the way out.
    pub fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Store a value, replacing any previous entry and its expiry.
    pub fn set(&self, key: &str, value: impl Into<String>, ttl_secs: u64) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.into(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
    }

    /// Remaining lifetime of a key in whole seconds, or [`TTL_ABSENT`]
    /// when the key does not exist or has expired.
    pub fn ttl(&self, key: &str) -> i64 {
        match self.entries.get(key) {
            Some(entry) => {
                let now = Instant::now();
                if entry.expires_at <= now {
                    TTL_ABSENT
                } else {
                    entry.expires_at.duration_since(now).as_secs() as i64
                }
            }
            None => TTL_ABSENT,
        }
    }

    /// Number of live-or-expired entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
