mod error;
mod memory;

pub use error::StorageError;
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Object-safe key-value persistence seam. Handlers and services only ever
/// talk to this trait, so the in-memory store can be swapped for a durable
/// one without touching any command logic.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn put(&self, key: &str, value: String) -> Result<(), StorageError>;
    async fn del(&self, key: &str) -> Result<(), StorageError>;
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}
