//! Cache-aside layer for league snapshots.
//!
//! Reads are served from the store while younger than the freshness TTL.
//! Entries outlive their freshness (the store keeps them for a longer
//! retention period) so that a failed refresh can fall back to the last
//! good snapshot. Store failures never fail a request: they are logged and
//! the layer behaves as if the cache were empty.

mod memory;
mod redis_store;

pub use memory::MemoryCacheStore;
pub use redis_store::RedisCacheStore;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::aggregate::{AggregateError, SnapshotSource};
use crate::config::CacheConfig;
use crate::models::{CachedSnapshot, LeagueId, LeagueSnapshot};

/// Errors from a cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Namespaced store key, `fpl:{resource}:{league_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(resource: &str, league_id: LeagueId) -> Self {
        Self(format!("fpl:{}:{}", resource, league_id))
    }

    /// Key of the full league snapshot.
    pub fn league_complete(league_id: LeagueId) -> Self {
        Self::new("league-complete", league_id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored snapshot and when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub snapshot: LeagueSnapshot,
    pub written_at: DateTime<Utc>,
}

/// Key-value persistence for cache entries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read an entry, regardless of its freshness.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Write an entry, to be kept for `retention`.
    async fn set(
        &self,
        key: &CacheKey,
        entry: &CacheEntry,
        retention: Duration,
    ) -> Result<(), CacheError>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Build the store selected by configuration.
pub async fn connect_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisCacheStore::connect(url).await?;
            info!("Using Redis cache store");
            Ok(Arc::new(store))
        }
        None => {
            info!("Using in-memory cache store");
            Ok(Arc::new(MemoryCacheStore::new()))
        }
    }
}

// ── Time ─────────────────────────────────────────────────────────

/// Source of wall-clock time for freshness checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ── League cache ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Entries younger than this are served without aggregating
    pub ttl: Duration,

    /// How long the store keeps an entry for stale fallback
    pub retention: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(120),
            retention: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl From<&CacheConfig> for CacheSettings {
    fn from(config: &CacheConfig) -> Self {
        Self {
            ttl: Duration::from_secs(config.ttl_seconds),
            retention: Duration::from_secs(config.retention_seconds),
        }
    }
}

/// Cache-aside access to league snapshots.
pub struct LeagueCache {
    source: Arc<dyn SnapshotSource>,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    settings: CacheSettings,
    /// Per-key refresh locks
    flights: StdMutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

/// A request's claim on a key's refresh lock.
///
/// Dropping it removes the map entry once no other request shares the lock,
/// including when the request future is cancelled.
struct Flight<'a> {
    cache: &'a LeagueCache,
    key: CacheKey,
    lock: Arc<Mutex<()>>,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut flights = self.cache.flights();
        // One reference in the map, one here
        if Arc::strong_count(&self.lock) == 2 {
            flights.remove(&self.key);
        }
    }
}

impl LeagueCache {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        store: Arc<dyn CacheStore>,
        settings: CacheSettings,
    ) -> Self {
        Self::with_clock(source, store, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn SnapshotSource>,
        store: Arc<dyn CacheStore>,
        settings: CacheSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            settings,
            flights: StdMutex::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Fetch a league snapshot, from cache when fresh.
    ///
    /// `force_refresh` skips the freshness check but still falls back to the
    /// stored entry if the refresh fails.
    pub async fn get(
        &self,
        league_id: LeagueId,
        force_refresh: bool,
    ) -> Result<CachedSnapshot, AggregateError> {
        let key = CacheKey::league_complete(league_id);

        if !force_refresh {
            if let Some(hit) = self.fresh_hit(&key).await {
                return Ok(hit);
            }
        }

        let flight = self.flight(&key);
        let _turn = flight.lock.lock().await;
        self.refresh(league_id, &key, force_refresh).await
    }

    async fn refresh(
        &self,
        league_id: LeagueId,
        key: &CacheKey,
        force_refresh: bool,
    ) -> Result<CachedSnapshot, AggregateError> {
        // Another request may have refreshed while we waited
        if !force_refresh {
            if let Some(hit) = self.fresh_hit(key).await {
                debug!("{} refreshed by a concurrent request", key);
                return Ok(hit);
            }
        }

        match self.source.snapshot(league_id).await {
            Ok(snapshot) => {
                let entry = CacheEntry {
                    snapshot,
                    written_at: self.clock.now(),
                };
                if let Err(e) = self.store.set(key, &entry, self.settings.retention).await {
                    warn!("Failed to write {} to {} cache: {}", key, self.backend(), e);
                }
                Ok(CachedSnapshot::fresh(entry.snapshot))
            }
            Err(err) => match self.read(key).await {
                Some(entry) => {
                    let age = self.age_ms(&entry);
                    warn!(
                        "Aggregation for league {} failed, serving stale entry aged {}ms: {}",
                        league_id, age, err
                    );
                    Ok(CachedSnapshot::stale(entry.snapshot, age, err.to_string()))
                }
                None => Err(err),
            },
        }
    }

    async fn fresh_hit(&self, key: &CacheKey) -> Option<CachedSnapshot> {
        let entry = self.read(key).await?;
        let age = self.age_ms(&entry);
        if u128::from(age) < self.settings.ttl.as_millis() {
            debug!("Cache hit for {} aged {}ms", key, age);
            Some(CachedSnapshot::hit(entry.snapshot, age))
        } else {
            debug!("Cache entry for {} expired at {}ms", key, age);
            None
        }
    }

    async fn read(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.store.get(key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read {} from {} cache: {}", key, self.backend(), e);
                None
            }
        }
    }

    fn age_ms(&self, entry: &CacheEntry) -> u64 {
        (self.clock.now() - entry.written_at)
            .num_milliseconds()
            .max(0) as u64
    }

    fn flights(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<Mutex<()>>>> {
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flight(&self, key: &CacheKey) -> Flight<'_> {
        let lock = Arc::clone(self.flights().entry(key.clone()).or_default());
        Flight {
            cache: self,
            key: key.clone(),
            lock,
        }
    }
}
