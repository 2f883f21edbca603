//! Storage module for asset blobs
//!
//! `AssetStorage` is what the filer services talk to; `MinIOClient` is the
//! MinIO/S3-compatible implementation used in deployments.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

/// Visibility of a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileVisibility {
    /// Served from a direct public URL
    Public,
    /// Served through presigned URLs only
    Private,
}

impl FileVisibility {
    pub fn from_is_public(is_public: bool) -> Self {
        if is_public {
            FileVisibility::Public
        } else {
            FileVisibility::Private
        }
    }
}

#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// Build the full object key for a path under the visibility prefix
    fn generate_key(&self, visibility: FileVisibility, path: &str) -> String;

    /// Store an object, returning its key
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<String, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// URL a client can fetch the object from
    async fn url(&self, key: &str) -> Result<String, AppError>;
}
