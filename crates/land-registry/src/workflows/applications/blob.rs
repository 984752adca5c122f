/// Error raised by the blob-storage provider.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob storage unavailable: {0}")]
    Unavailable(String),
}

/// Document byte storage. The workflow only persists the returned key as
/// `Document::storage_key` and never interprets its format.
pub trait BlobStorage: Send + Sync {
    /// Stores the object and returns the key it is retrievable under.
    fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, BlobError>;

    /// Mints a time-limited download URL, or `None` when the key is unknown.
    fn presigned_get(&self, key: &str) -> Result<Option<String>, BlobError>;
}
