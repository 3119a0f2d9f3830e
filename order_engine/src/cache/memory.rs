use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::traits::{CacheError, DuplicateCache};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// An in-process TTL cache over a concurrent hash map.
///
/// Entries are expired lazily on access. Clones share the underlying map, so a single
/// `MemoryCache` can be handed to every intake channel.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every expired entry. Called opportunistically; correctness never depends on it.
    pub fn purge_expired(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }
}

impl DuplicateCache for MemoryCache {
    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.fetch(key).await?.is_some())
    }

    async fn store(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry { value: value.to_string(), expires_at: Utc::now() + ttl };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<Option<String>, CacheError> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.is_expired() => true,
            Some(entry) => return Ok(Some(entry.value.clone())),
            None => return Ok(None),
        };
        // the map guard must be dropped before removing, or the shard deadlocks
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn store_and_fetch() {
        let cache = MemoryCache::new();
        cache.store("k1", "v1", Duration::hours(1)).await.unwrap();
        assert_eq!(cache.fetch("k1").await.unwrap().as_deref(), Some("v1"));
        assert!(cache.exists("k1").await.unwrap());
        assert!(!cache.exists("k2").await.unwrap());
    }

    #[tokio::test]
    async fn expired_entries_vanish() {
        let cache = MemoryCache::new();
        cache.store("k1", "v1", Duration::milliseconds(-1)).await.unwrap();
        assert_eq!(cache.fetch("k1").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let cache = MemoryCache::new();
        cache.store("k1", "v1", Duration::hours(1)).await.unwrap();
        cache.delete("k1").await.unwrap();
        cache.delete("k1").await.unwrap();
        assert!(!cache.exists("k1").await.unwrap());
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let cache = MemoryCache::new();
        cache.store("live", "v", Duration::hours(1)).await.unwrap();
        cache.store("dead", "v", Duration::milliseconds(-1)).await.unwrap();
        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        assert!(cache.exists("live").await.unwrap());
    }
}
