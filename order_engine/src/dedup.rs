//! Duplicate screening.
//!
//! Every incoming order is screened against a fast cache keyed on the producer-assigned order
//! id. The cache is best-effort: on a miss, a timeout or any cache failure the guard falls back
//! to the durable store, which remains authoritative through its uniqueness constraint.

use std::time::Duration as StdDuration;

use chrono::Duration;
use log::*;
use tokio::time::timeout;

use crate::{
    db_types::OrderId,
    traits::{DuplicateCache, OrderRepository, OrderRepositoryError},
};

pub const DUPLICATE_KEY_PREFIX: &str = "order:duplicate:";
pub const DUPLICATE_MARKER: &str = "processed";

pub const DEFAULT_RETENTION_HOURS: i64 = 24;
pub const DEFAULT_CACHE_TIMEOUT_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// How long a processed order id is remembered by the cache.
    pub retention: Duration,
    /// How long to wait for the cache before falling back to the durable store.
    pub cache_timeout: StdDuration,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            retention: Duration::hours(DEFAULT_RETENTION_HOURS),
            cache_timeout: StdDuration::from_millis(DEFAULT_CACHE_TIMEOUT_MS),
        }
    }
}

/// Screens order ids against the duplicate cache, falling back to the durable store whenever
/// the cache cannot answer in time.
#[derive(Debug, Clone)]
pub struct DuplicateGuard<C> {
    cache: C,
    config: DedupConfig,
}

impl<C: DuplicateCache> DuplicateGuard<C> {
    pub fn new(cache: C, config: DedupConfig) -> Self {
        Self { cache, config }
    }

    fn key(order_id: &OrderId) -> String {
        format!("{DUPLICATE_KEY_PREFIX}{}", order_id.as_str())
    }

    /// Returns whether `order_id` has already been processed.
    ///
    /// A cache hit answers immediately. A cache miss, error or timeout consults the durable
    /// store instead, so a degraded cache can only slow intake down, never corrupt it.
    pub async fn is_duplicate<B: OrderRepository>(
        &self,
        db: &B,
        order_id: &OrderId,
    ) -> Result<bool, OrderRepositoryError> {
        let key = Self::key(order_id);
        match timeout(self.config.cache_timeout, self.cache.exists(&key)).await {
            Ok(Ok(true)) => {
                trace!("🔄️ Cache hit for order {order_id}");
                return Ok(true);
            },
            Ok(Ok(false)) => {
                trace!("🔄️ Cache miss for order {order_id}. Verifying against the store.");
            },
            Ok(Err(e)) => {
                warn!("🔄️ Duplicate cache error for order {order_id} ({e}). Falling back to the store.");
            },
            Err(_) => {
                warn!(
                    "🔄️ Duplicate cache did not answer within {}ms for order {order_id}. Falling back to the store.",
                    self.config.cache_timeout.as_millis()
                );
            },
        }
        db.order_exists(order_id).await
    }

    /// Records `order_id` as processed. Best-effort: a cache failure is logged and swallowed,
    /// since the store's uniqueness constraint still catches resubmissions.
    pub async fn mark_seen(&self, order_id: &OrderId) {
        let key = Self::key(order_id);
        let result = timeout(self.config.cache_timeout, self.cache.store(&key, DUPLICATE_MARKER, self.config.retention))
            .await;
        match result {
            Ok(Ok(())) => trace!("🔄️ Order {order_id} recorded in the duplicate cache"),
            Ok(Err(e)) => warn!("🔄️ Could not record order {order_id} in the duplicate cache: {e}"),
            Err(_) => warn!("🔄️ Timed out recording order {order_id} in the duplicate cache"),
        }
    }
}
