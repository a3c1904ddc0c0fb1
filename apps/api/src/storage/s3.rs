//! S3-backed artifact store. Works against MinIO locally and AWS in
//! production; the client is built once at startup and shared.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;

use crate::storage::{ArtifactStore, StorageError};

pub struct S3ArtifactStore {
    client: S3Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        S3ArtifactStore {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        info!(key = %key, bucket = %self.bucket, size, "Artifact uploaded");
        Ok(())
    }

    async fn presigned_link(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        let presigning =
            PresigningConfig::expires_in(ttl).map_err(|e| StorageError::Signing(e.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Signing(e.to_string()))?;
        Ok(presigned.uri().to_string())
    }
}
