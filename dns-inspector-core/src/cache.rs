//! Session cache
//!
//! Process-lifetime key/value store with per-entry expiry. Values are stored as
//! `serde_json::Value` snapshots, so `set` copies in and `get` hands back a fresh
//! deserialized copy; a caller can never mutate a cached value in place.
//!
//! Expiry is checked on every `get`. [`SessionCache::spawn_sweeper`] additionally
//! evicts expired entries in the background, but readers never rely on it.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::CoreResult;

struct CacheEntry {
    value: Value,
    /// `None` when the TTL is too large to represent; such entries never expire.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory session cache
///
/// Construct one per session and share it via `Arc`.
#[derive(Default)]
pub struct SessionCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl SessionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `value` under `key` for `ttl`, replacing any previous entry
    /// and resetting its expiry.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: impl Into<String>,
        value: &T,
        ttl: Duration,
    ) -> CoreResult<()> {
        let key = key.into();
        let value = serde_json::to_value(value)?;
        let expires_at = Instant::now().checked_add(ttl);
        log::trace!("[Cache] set {key} (ttl {}s)", ttl.as_secs());
        self.entries
            .write()
            .await
            .insert(key, CacheEntry { value, expires_at });
        Ok(())
    }

    /// Fetch a fresh copy of the value under `key`.
    ///
    /// Expired entries are evicted and reported as absent. An entry that does not
    /// deserialize as `T` is also reported as absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let value = {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => entry.value.clone(),
                Some(_) => {
                    drop(entries);
                    self.evict_if_expired(key, now).await;
                    return None;
                }
            }
        };

        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("[Cache] Entry {key} has an unexpected shape: {e}");
                None
            }
        }
    }

    /// Remove `key`. Returns whether a live entry was removed.
    pub async fn remove(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .write()
            .await
            .remove(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let old = std::mem::take(&mut *self.entries.write().await);
        log::debug!("[Cache] Cleared {} entries", old.len());
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Evict every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        let purged = before - entries.len();
        if purged > 0 {
            log::debug!("[Cache] Purged {purged} expired entries");
        }
        purged
    }

    /// Periodically purge expired entries until the cache is dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    log::debug!("[Cache] Sweeper stopped");
                    break;
                };
                cache.purge_expired().await;
            }
        })
    }

    async fn evict_if_expired(&self, key: &str, now: Instant) {
        let mut entries = self.entries.write().await;
        // a concurrent set may have refreshed the entry
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
            log::trace!("[Cache] Evicted expired {key}");
        }
    }
}

/// Cache key helpers, one namespace per data class.
pub mod keys {
    pub fn dns(domain: &str) -> String {
        format!("dns:{domain}")
    }

    pub fn dmarc(domain: &str) -> String {
        format!("dmarc:{domain}")
    }

    pub fn tls(url: &str) -> String {
        format!("tls:{url}")
    }

    pub fn cloud(domain: &str) -> String {
        format!("cloud:{domain}")
    }

    pub fn security(domain: &str, url: &str) -> String {
        format!("security:{domain}|{url}")
    }
}
