use std::sync::{Arc, Mutex};

use chrono::Duration;

use crate::{
    db_types::Order,
    traits::{CacheError, DuplicateCache, OrderPublisher, PublicationError},
};

/// A cache that is always down. Used to verify that the pipeline degrades to the durable store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCache;

impl DuplicateCache for FailingCache {
    async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable("cache is down".to_string()))
    }

    async fn store(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache is down".to_string()))
    }

    async fn fetch(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("cache is down".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache is down".to_string()))
    }
}

/// Records every published order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    published: Arc<Mutex<Vec<Order>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Order> {
        self.published.lock().unwrap().clone()
    }
}

impl OrderPublisher for RecordingPublisher {
    async fn publish_order(&self, order: &Order) -> Result<(), PublicationError> {
        self.published.lock().unwrap().push(order.clone());
        Ok(())
    }
}
