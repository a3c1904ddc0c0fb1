//! Artifact storage boundary. Finished renders are written under an
//! opaque key and handed back to the user as a time-limited download
//! link; nothing in the conversation layer knows which backend signed it.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod s3;

pub use s3::S3ArtifactStore;

/// Default lifetime of a download link.
pub const DEFAULT_LINK_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("artifact upload failed: {0}")]
    Upload(String),

    #[error("link signing failed: {0}")]
    Signing(String),
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str)
        -> Result<(), StorageError>;

    /// Signs a GET link for an already-stored object.
    async fn presigned_link(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;
}

/// Key layout for rendered resumes: one folder per resume, one object
/// per persisted version.
pub fn artifact_key(resume_id: uuid::Uuid, version: i32, file_ext: &str) -> String {
    format!("exports/{resume_id}/v{version}.{file_ext}")
}
