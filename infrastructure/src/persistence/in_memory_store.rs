// ./infrastructure/src/persistence/in_memory_store.rs
use application::{ApplicationError, KeyValueStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Volatile key-value adapter. Backs tests and acts as a last-resort
/// fallback when no durable storage is available; contents vanish with the
/// process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    data: Arc<DashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, ApplicationError> {
        debug!(key, "Reading value from in-memory store");
        Ok(self.data.get(key).map(|value| value.clone()))
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> Result<(), ApplicationError> {
        debug!(key, bytes = value.len(), "Writing value to in-memory store");
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), ApplicationError> {
        debug!("Clearing in-memory store namespace");
        self.data.clear();
        Ok(())
    }
}
