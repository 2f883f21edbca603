use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppForm;
use crate::features::auth::guards::RequireStaff;
use crate::features::clipboard::dtos::{
    redirect_target, ClipboardActionDto, ClipboardOperationDto, PasteClipboardDto,
};
use crate::features::clipboard::services::ClipboardService;
use crate::shared::types::ApiResponse;

/// Move every file on a clipboard into a folder
#[utoipa::path(
    post,
    path = "/api/admin/filer/clipboard/operations/paste_clipboard_to_folder/",
    tag = "clipboard",
    request_body(content = PasteClipboardDto, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Files moved", body = ApiResponse<ClipboardOperationDto>),
        (status = 303, description = "Files moved, redirecting to redirect_to"),
        (status = 400, description = "Invalid form"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not staff, not the clipboard owner, or no permission on the folder"),
        (status = 404, description = "Clipboard or folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn paste_clipboard_to_folder(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<ClipboardService>>,
    AppForm(dto): AppForm<PasteClipboardDto>,
) -> Result<Response> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = service
        .paste_to_folder(&user, dto.clipboard_id, dto.folder_id)
        .await?;

    Ok(operation_response(
        result,
        redirect_target(&dto.redirect_to),
        "Clipboard pasted into folder",
    ))
}

/// Remove every item from a clipboard, keeping the files
#[utoipa::path(
    post,
    path = "/api/admin/filer/clipboard/operations/discard_clipboard/",
    tag = "clipboard",
    request_body(content = ClipboardActionDto, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Clipboard emptied", body = ApiResponse<ClipboardOperationDto>),
        (status = 303, description = "Clipboard emptied, redirecting to redirect_to"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not staff or not the clipboard owner"),
        (status = 404, description = "Clipboard not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn discard_clipboard(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<ClipboardService>>,
    AppForm(dto): AppForm<ClipboardActionDto>,
) -> Result<Response> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = service.discard(&user, dto.clipboard_id).await?;

    Ok(operation_response(
        result,
        redirect_target(&dto.redirect_to),
        "Clipboard discarded",
    ))
}

/// Delete every file on a clipboard
#[utoipa::path(
    post,
    path = "/api/admin/filer/clipboard/operations/delete_clipboard/",
    tag = "clipboard",
    request_body(content = ClipboardActionDto, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Files deleted", body = ApiResponse<ClipboardOperationDto>),
        (status = 303, description = "Files deleted, redirecting to redirect_to"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not staff or not the clipboard owner"),
        (status = 404, description = "Clipboard not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_clipboard(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<ClipboardService>>,
    AppForm(dto): AppForm<ClipboardActionDto>,
) -> Result<Response> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = service.delete(&user, dto.clipboard_id).await?;

    Ok(operation_response(
        result,
        redirect_target(&dto.redirect_to),
        "Clipboard files deleted",
    ))
}

fn operation_response(
    result: ClipboardOperationDto,
    redirect_to: Option<&str>,
    message: &str,
) -> Response {
    match redirect_to {
        Some(target) => Redirect::to(target).into_response(),
        None => Json(ApiResponse::success(
            Some(result),
            Some(message.to_string()),
            None,
        ))
        .into_response(),
    }
}
