use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{KvStore, StorageError};

/// Process-local store. Contents live only as long as the process; every
/// restart starts from an empty map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|key| key.starts_with(prefix))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_values() {
        let store = MemoryStore::new();
        store.put("user:1", "a".to_string()).await.unwrap();
        assert_eq!(store.get("user:1").await.unwrap(), Some("a".to_string()));

        store.del("user:1").await.unwrap();
        assert_eq!(store.get("user:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn keys_filters_by_prefix() {
        let store = MemoryStore::new();
        store.put("user:1", "a".to_string()).await.unwrap();
        store.put("user:2", "b".to_string()).await.unwrap();
        store.put("session:9", "c".to_string()).await.unwrap();

        let mut keys = store.keys("user:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["user:1".to_string(), "user:2".to_string()]);
    }
}
