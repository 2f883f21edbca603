use std::sync::Arc;

use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::clipboard::dtos::ClipboardOperationDto;
use crate::features::clipboard::models::Clipboard;
use crate::features::clipboard::repositories::ClipboardRepository;
use crate::features::files::repositories::FileRepository;
use crate::features::files::services::FileService;
use crate::features::folders::FolderRepository;

/// Service for clipboard operations
pub struct ClipboardService {
    clipboards: Arc<dyn ClipboardRepository>,
    files: Arc<dyn FileRepository>,
    folders: Arc<dyn FolderRepository>,
    file_service: Arc<FileService>,
    permissions_enabled: bool,
}

impl ClipboardService {
    pub fn new(
        clipboards: Arc<dyn ClipboardRepository>,
        files: Arc<dyn FileRepository>,
        folders: Arc<dyn FolderRepository>,
        file_service: Arc<FileService>,
        permissions_enabled: bool,
    ) -> Self {
        Self {
            clipboards,
            files,
            folders,
            file_service,
            permissions_enabled,
        }
    }

    /// Put a file on the user's clipboard, creating the clipboard on demand
    pub async fn add_file(&self, user: &AuthenticatedUser, file_id: i64) -> Result<Clipboard> {
        let clipboard = self.clipboards.get_or_create_for_user(&user.sub).await?;
        self.clipboards.add_file(clipboard.id, file_id).await?;
        Ok(clipboard)
    }

    /// Move every file on the clipboard into the folder, then empty it
    pub async fn paste_to_folder(
        &self,
        user: &AuthenticatedUser,
        clipboard_id: i64,
        folder_id: i64,
    ) -> Result<ClipboardOperationDto> {
        let clipboard = self.owned_clipboard(user, clipboard_id).await?;

        let folder = self
            .folders
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Folder {} not found", folder_id)))?;

        if !self
            .folders
            .can_add_children(&folder, user, self.permissions_enabled)
            .await?
        {
            return Err(AppError::Forbidden(
                "You are not allowed to add files to this folder".to_string(),
            ));
        }

        let moved = self
            .clipboards
            .paste_into_folder(clipboard.id, folder.id)
            .await?;

        info!(
            "Clipboard {} pasted into folder {}: {} file(s) moved",
            clipboard.id, folder.id, moved
        );

        Ok(ClipboardOperationDto {
            clipboard_id: clipboard.id,
            affected_files: moved,
        })
    }

    /// Empty the clipboard; its files stay where they are
    pub async fn discard(
        &self,
        user: &AuthenticatedUser,
        clipboard_id: i64,
    ) -> Result<ClipboardOperationDto> {
        let clipboard = self.owned_clipboard(user, clipboard_id).await?;
        let removed = self.clipboards.clear(clipboard.id).await?;

        info!("Clipboard {} discarded: {} item(s)", clipboard.id, removed);

        Ok(ClipboardOperationDto {
            clipboard_id: clipboard.id,
            affected_files: removed,
        })
    }

    /// Delete every file on the clipboard
    pub async fn delete(
        &self,
        user: &AuthenticatedUser,
        clipboard_id: i64,
    ) -> Result<ClipboardOperationDto> {
        let clipboard = self.owned_clipboard(user, clipboard_id).await?;
        let file_ids = self.file_ids(&clipboard).await?;

        let mut deleted = 0;
        for file in self.files.find_many(&file_ids).await? {
            self.file_service.delete_file(&file).await?;
            deleted += 1;
        }
        // Items whose file row was already gone
        self.clipboards.clear(clipboard.id).await?;

        info!("Clipboard {} deleted: {} file(s)", clipboard.id, deleted);

        Ok(ClipboardOperationDto {
            clipboard_id: clipboard.id,
            affected_files: deleted,
        })
    }

    async fn owned_clipboard(&self, user: &AuthenticatedUser, id: i64) -> Result<Clipboard> {
        let clipboard = self
            .clipboards
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Clipboard {} not found", id)))?;

        if !clipboard.is_accessible_by(user) {
            return Err(AppError::Forbidden(
                "Clipboard belongs to another user".to_string(),
            ));
        }

        Ok(clipboard)
    }

    async fn file_ids(&self, clipboard: &Clipboard) -> Result<Vec<i64>> {
        let items = self.clipboards.items(clipboard.id).await?;
        Ok(items.into_iter().map(|item| item.file_id).collect())
    }
}
