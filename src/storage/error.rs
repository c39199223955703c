#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
