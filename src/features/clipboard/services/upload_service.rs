use std::sync::Arc;

use tracing::{error, info, warn};
use validator::Validate;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::clipboard::dtos::{form_errors_summary, UploadForm, UploadResponseDto};
use crate::features::clipboard::error::UploadError;
use crate::features::clipboard::services::ClipboardService;
use crate::features::files::kinds::UploadContext;
use crate::features::files::models::File;
use crate::features::files::registry::FileTypeRegistry;
use crate::features::files::services::{select_icon, FileService, StoreFile};
use crate::features::folders::{Folder, FolderRepository};

/// A decoded upload request
#[derive(Debug)]
pub struct RawUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// What a completed upload request produced
#[derive(Debug)]
pub enum UploadOutcome {
    Created(UploadResponseDto),
    /// The file was stored but no icon could be made for it; it has been
    /// removed again
    IconsUnavailable,
}

/// Upload flow of the clipboard admin
pub struct UploadService {
    registry: Arc<FileTypeRegistry>,
    folders: Arc<dyn FolderRepository>,
    file_service: Arc<FileService>,
    clipboard_service: Arc<ClipboardService>,
    is_public_default: bool,
    permissions_enabled: bool,
}

impl UploadService {
    pub fn new(
        registry: Arc<FileTypeRegistry>,
        folders: Arc<dyn FolderRepository>,
        file_service: Arc<FileService>,
        clipboard_service: Arc<ClipboardService>,
        is_public_default: bool,
        permissions_enabled: bool,
    ) -> Self {
        Self {
            registry,
            folders,
            file_service,
            clipboard_service,
            is_public_default,
            permissions_enabled,
        }
    }

    pub async fn upload(
        &self,
        user: &AuthenticatedUser,
        folder_id: Option<i64>,
        upload: RawUpload,
    ) -> Result<UploadOutcome, UploadError> {
        let context = UploadContext {
            user,
            content_type: upload.content_type.as_deref(),
        };
        let file_type = self
            .registry
            .resolve(&upload.filename, &upload.data, &context)
            .ok_or_else(|| UploadError::SubtypeUnresolved(upload.filename.clone()))?;

        let form = UploadForm::new(&upload.filename, &user.sub, upload.data.len());
        form.validate()
            .map_err(|errors| UploadError::FormInvalid(form_errors_summary(&errors)))?;

        let folder = self.resolve_folder(user, folder_id).await?;

        let file = self
            .file_service
            .store(StoreFile {
                file_type,
                filename: &upload.filename,
                content_type: upload.content_type.as_deref(),
                data: &upload.data,
                owner_id: &user.sub,
                folder_id: folder.as_ref().map(|f| f.id),
                is_public: self.is_public_default,
            })
            .await?;

        match self.finish(user, &file, folder.is_none(), &upload.data).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(file_id = file.id, error = %e, "Upload failed after saving, removing file");
                if let Err(cleanup) = self.file_service.delete_file(&file).await {
                    error!(file_id = file.id, error = %cleanup, "Failed to remove file");
                }
                Err(e)
            }
        }
    }

    /// Steps after the file is saved. An error here leaves a file nobody can
    /// reach, so the caller removes it.
    async fn finish(
        &self,
        user: &AuthenticatedUser,
        file: &File,
        stage_on_clipboard: bool,
        data: &[u8],
    ) -> Result<UploadOutcome, UploadError> {
        let thumbnails = self.file_service.thumbnails();
        let rendered = thumbnails.icons(file, data).await;
        if rendered.icons.is_empty() {
            warn!(
                file_id = file.id,
                filename = %file.original_filename,
                "No icons could be generated, removing upload"
            );
            self.file_service.delete_file(file).await?;
            return Ok(UploadOutcome::IconsUnavailable);
        }

        if let Some((width, height)) = rendered.dimensions {
            self.file_service
                .record_dimensions(file, width, height)
                .await?;
        }

        if stage_on_clipboard {
            self.clipboard_service.add_file(user, file.id).await?;
        }

        let mut response = UploadResponseDto {
            thumbnail: select_icon(&rendered.icons, thumbnails.icon_sizes()),
            alt_text: String::new(),
            label: file.label().to_string(),
            file_id: file.id,
            thumbnail_180: None,
            original_image: None,
        };

        if file.is_image() {
            response.thumbnail_180 = Some(thumbnails.preview(file, data).await?);
            response.original_image = Some(self.file_service.url(file).await?);
        }

        info!(
            "Upload complete: file_id={}, folder={:?}, owner={}",
            file.id, file.folder_id, user.sub
        );

        Ok(UploadOutcome::Created(response))
    }

    async fn resolve_folder(
        &self,
        user: &AuthenticatedUser,
        folder_id: Option<i64>,
    ) -> Result<Option<Folder>, UploadError> {
        let Some(folder_id) = folder_id else {
            return Ok(None);
        };

        let folder = self
            .folders
            .find_by_id(folder_id)
            .await?
            .ok_or(UploadError::FolderNotFound)?;

        if !self
            .folders
            .can_add_children(&folder, user, self.permissions_enabled)
            .await?
        {
            return Err(UploadError::PermissionDenied);
        }

        Ok(Some(folder))
    }
}
