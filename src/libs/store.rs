//! Key-value persistence used for the entry flag.

use super::error::GeofenceResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = GeofenceResult<Option<String>>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = GeofenceResult<()>> + Send;

    /// Removes the key. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = GeofenceResult<()>> + Send;
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> GeofenceResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> GeofenceResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> GeofenceResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}
