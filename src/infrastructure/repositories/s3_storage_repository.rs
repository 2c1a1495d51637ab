use super::storage_repository::StorageRepository;
use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, types::ObjectCannedAcl, Client as S3Client};
use std::sync::Arc;
use std::time::Duration;

/// S3-compatible implementation of the storage repository. Works against
/// AWS S3 proper and Linode-style object storage via an endpoint override.
pub struct S3StorageRepository {
    client: Arc<S3Client>,
    bucket: String,
    endpoint_url: String,
    timeout: Duration,
}

impl S3StorageRepository {
    pub fn new(
        client: Arc<S3Client>,
        bucket: String,
        endpoint_url: String,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            bucket,
            endpoint_url,
            timeout,
        }
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(&self.endpoint_url, &self.bucket, key)
    }
}

#[async_trait]
impl StorageRepository for S3StorageRepository {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String, String> {
        let start_time = std::time::Instant::now();
        let size = bytes.len();

        tracing::info!(
            bucket = %self.bucket,
            key = key,
            size_bytes = size,
            "Uploading audio to object storage"
        );

        let put = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type("audio/mpeg")
            .acl(ObjectCannedAcl::PublicRead)
            .send();

        tokio::time::timeout(self.timeout, put)
            .await
            .map_err(|_| format!("storage upload timed out after {:?}", self.timeout))?
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = key,
                    "Object storage upload failed"
                );
                format!("storage upload failed: {}", e)
            })?;

        let url = self.public_url(key);

        tracing::info!(
            url = %url,
            size_bytes = size,
            latency_ms = start_time.elapsed().as_millis(),
            "Upload completed"
        );

        Ok(url)
    }
}

fn join_public_url(endpoint_url: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", endpoint_url.trim_end_matches('/'), bucket, key)
}

#[cfg(test)]
mod tests {
    use super::join_public_url;

    #[test]
    fn public_url_joins_endpoint_bucket_and_key() {
        assert_eq!(
            join_public_url(
                "https://nl-ams-1.linodeobjects.com",
                "japanese-translations",
                "abc.mp3"
            ),
            "https://nl-ams-1.linodeobjects.com/japanese-translations/abc.mp3"
        );
    }

    #[test]
    fn public_url_tolerates_trailing_slash() {
        assert_eq!(
            join_public_url("https://example.com/", "bucket", "k.mp3"),
            "https://example.com/bucket/k.mp3"
        );
    }
}
