use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers, ModelPermissions};
use crate::features::clipboard::{dtos as clipboard_dtos, handlers as clipboard_handlers};
use crate::features::files::FileType;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Admin site
        admin_handlers::admin_index,
        // Clipboard uploads
        clipboard_handlers::upload_to_folder,
        clipboard_handlers::upload_without_folder,
        // Clipboard operations
        clipboard_handlers::paste_clipboard_to_folder,
        clipboard_handlers::discard_clipboard,
        clipboard_handlers::delete_clipboard,
    ),
    components(
        schemas(
            Meta,
            FileType,
            // Admin
            ModelPermissions,
            admin_dtos::AdminModelDto,
            ApiResponse<Vec<admin_dtos::AdminModelDto>>,
            // Uploads
            clipboard_dtos::UploadFileDto,
            clipboard_dtos::UploadResponseDto,
            clipboard_dtos::UploadErrorDto,
            // Clipboard
            clipboard_dtos::PasteClipboardDto,
            clipboard_dtos::ClipboardActionDto,
            clipboard_dtos::ClipboardOperationDto,
            ApiResponse<clipboard_dtos::ClipboardOperationDto>,
        )
    ),
    tags(
        (name = "admin", description = "Filer admin site (staff only)"),
        (name = "clipboard", description = "Uploads and clipboard operations"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Filer API",
        version = "0.1.0",
        description = "Folder-based asset management: uploads, clipboard and admin operations",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
