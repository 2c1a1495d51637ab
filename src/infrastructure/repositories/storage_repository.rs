use async_trait::async_trait;

/// Repository for blob uploads.
/// Abstracts the object store (S3-compatible bucket).
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Upload audio bytes under the given key.
    ///
    /// Returns the public URL of the stored object.
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String, String>;
}
