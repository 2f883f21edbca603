use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::admin::{ModelAdmin, ModelPermissions};
use crate::features::clipboard::handlers::{
    delete_clipboard, discard_clipboard, paste_clipboard_to_folder, upload_to_folder,
    upload_without_folder,
};
use crate::features::clipboard::services::{ClipboardService, UploadService};
use crate::shared::constants::MULTIPART_OVERHEAD;

/// Admin registration of the clipboard: no index entry, only operations
pub struct ClipboardAdmin {
    upload_service: Arc<UploadService>,
    clipboard_service: Arc<ClipboardService>,
    max_upload_size: usize,
}

impl ClipboardAdmin {
    pub fn new(
        upload_service: Arc<UploadService>,
        clipboard_service: Arc<ClipboardService>,
        max_upload_size: usize,
    ) -> Self {
        Self {
            upload_service,
            clipboard_service,
            max_upload_size,
        }
    }
}

impl ModelAdmin for ClipboardAdmin {
    fn model_name(&self) -> &'static str {
        "clipboard"
    }

    fn verbose_name(&self) -> &'static str {
        "DEBUG Clipboard"
    }

    fn model_perms(&self) -> ModelPermissions {
        ModelPermissions::NONE
    }

    fn routes(&self) -> Router {
        let uploads = Router::new()
            .route(
                "/operations/upload/{folder_id}/",
                get(upload_to_folder).post(upload_to_folder),
            )
            .route(
                "/operations/upload/no_folder/",
                get(upload_without_folder).post(upload_without_folder),
            )
            .layer(DefaultBodyLimit::max(
                self.max_upload_size + MULTIPART_OVERHEAD,
            ))
            .with_state(Arc::clone(&self.upload_service));

        let operations = Router::new()
            .route(
                "/operations/paste_clipboard_to_folder/",
                post(paste_clipboard_to_folder),
            )
            .route("/operations/discard_clipboard/", post(discard_clipboard))
            .route("/operations/delete_clipboard/", post(delete_clipboard))
            .with_state(Arc::clone(&self.clipboard_service));

        uploads.merge(operations)
    }
}
