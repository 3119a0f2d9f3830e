use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("The cache is unavailable: {0}")]
    Unavailable(String),
    #[error("The cache did not answer within the configured timeout")]
    Timeout,
}

/// A fast, best-effort key/value store used to screen out duplicate submissions before they
/// reach the durable store.
///
/// Implementations may lose entries at any time (restart, eviction, expiry). The pipeline
/// treats every cache failure as a miss and falls back to the durable store, so a `DuplicateCache`
/// must never be the only line of defence against duplicates.
#[allow(async_fn_in_trait)]
pub trait DuplicateCache {
    /// Returns whether `key` is present (and not expired).
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Stores `value` under `key` with the given time-to-live.
    async fn store(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Returns the live value under `key`, if any.
    async fn fetch(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
