use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::content_type::guess_content_type;
use crate::features::files::models::{File, FileType, NewFile};
use crate::features::files::repositories::FileRepository;
use crate::features::files::services::ThumbnailService;
use crate::modules::storage::{AssetStorage, FileVisibility};

/// An uploaded payload ready to be persisted
pub struct StoreFile<'a> {
    pub file_type: FileType,
    pub filename: &'a str,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
    pub owner_id: &'a str,
    pub folder_id: Option<i64>,
    pub is_public: bool,
}

/// Service for file blobs and their rows
pub struct FileService {
    files: Arc<dyn FileRepository>,
    storage: Arc<dyn AssetStorage>,
    thumbnails: Arc<ThumbnailService>,
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn AssetStorage>,
        thumbnails: Arc<ThumbnailService>,
    ) -> Self {
        Self {
            files,
            storage,
            thumbnails,
        }
    }

    pub fn thumbnails(&self) -> &ThumbnailService {
        &self.thumbnails
    }

    /// Upload the blob and insert the row. The blob is removed again when the
    /// insert fails.
    pub async fn store(&self, request: StoreFile<'_>) -> Result<File> {
        let path = format!(
            "filer/{}/{}",
            Uuid::new_v4(),
            storage_filename(request.filename)
        );
        let file_key = self
            .storage
            .generate_key(FileVisibility::from_is_public(request.is_public), &path);
        let content_type = request
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| guess_content_type(request.filename));

        self.storage
            .upload(&file_key, request.data.to_vec(), content_type)
            .await?;
        debug!("File uploaded to storage: {}", file_key);

        let new_file = NewFile {
            polymorphic_type: request.file_type,
            folder_id: request.folder_id,
            file_key: file_key.clone(),
            file_size: request.data.len() as i64,
            checksum: sha256_hex(request.data),
            original_filename: request.filename.to_string(),
            owner_id: request.owner_id.to_string(),
            is_public: request.is_public,
        };

        let file = match self.files.create(new_file).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&file_key).await {
                    warn!("Failed to remove orphaned blob {}: {}", file_key, cleanup);
                }
                return Err(e);
            }
        };

        info!(
            "File saved: id={}, type={}, key={}, size={}",
            file.id,
            file.polymorphic_type.as_str(),
            file.file_key,
            file.file_size
        );

        Ok(file)
    }

    pub async fn record_dimensions(&self, file: &File, width: u32, height: u32) -> Result<()> {
        self.files.save_image_dimensions(file.id, width, height).await
    }

    pub async fn url(&self, file: &File) -> Result<String> {
        self.storage.url(&file.file_key).await
    }

    /// Delete a file's row, blob and renditions
    pub async fn delete_file(&self, file: &File) -> Result<()> {
        if !self.files.delete(file.id).await? {
            return Err(AppError::NotFound(format!("File {} not found", file.id)));
        }

        self.thumbnails.delete_renditions(file).await;
        if let Err(e) = self.storage.delete(&file.file_key).await {
            warn!("Failed to delete blob {}: {}", file.file_key, e);
        }

        info!("File deleted: id={}, key={}", file.id, file.file_key);
        Ok(())
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Last path segment of a client filename, reduced to characters safe in an
/// object key
fn storage_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
