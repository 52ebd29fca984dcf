//! In-process cache store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::{CacheEntry, CacheError, CacheKey, CacheStore};

struct Slot {
    entry: CacheEntry,
    expires_at: Instant,
}

/// Keeps entries in a map until their retention period passes.
#[derive(Default)]
pub struct MemoryCacheStore {
    slots: RwLock<HashMap<CacheKey, Slot>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| slot.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let now = Instant::now();
        {
            let slots = self.slots.read().await;
            match slots.get(key) {
                None => return Ok(None),
                Some(slot) if slot.expires_at > now => return Ok(Some(slot.entry.clone())),
                Some(_) => {}
            }
        }

        // Past retention: evict
        let mut slots = self.slots.write().await;
        if slots.get(key).is_some_and(|slot| slot.expires_at <= now) {
            slots.remove(key);
            debug!("Evicted expired cache entry {}", key);
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &CacheKey,
        entry: &CacheEntry,
        retention: Duration,
    ) -> Result<(), CacheError> {
        let slot = Slot {
            entry: entry.clone(),
            expires_at: Instant::now() + retention,
        };
        self.slots.write().await.insert(key.clone(), slot);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::sample_entry;
    use crate::models::LeagueId;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryCacheStore::new();
        let key = CacheKey::league_complete(LeagueId::new(1));
        assert!(store.get(&key).await.unwrap().is_none());

        let entry = sample_entry(1);
        store
            .set(&key, &entry, Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get(&key).await.unwrap(), Some(entry));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_evicted_after_retention() {
        let store = MemoryCacheStore::new();
        let key = CacheKey::league_complete(LeagueId::new(1));
        store
            .set(&key, &sample_entry(1), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.get(&key).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get(&key).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = MemoryCacheStore::new();
        let a = CacheKey::league_complete(LeagueId::new(1));
        let b = CacheKey::league_complete(LeagueId::new(2));
        store
            .set(&a, &sample_entry(1), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(store.get(&b).await.unwrap().is_none());
    }
}
