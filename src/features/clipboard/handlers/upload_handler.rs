use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::features::auth::model::AuthenticatedUser;
use crate::features::clipboard::dtos::{
    UploadErrorDto, UploadFileDto, UploadQuery, UploadResponseDto,
};
use crate::features::clipboard::error::UploadError;
use crate::features::clipboard::services::{RawUpload, UploadOutcome, UploadService};

const ICONS_UNAVAILABLE: &str = "failed to generate icons for file";

/// Upload a file into a folder
///
/// Accepts either `multipart/form-data` with exactly one file part, or a raw
/// `POST` body sent with `X-Requested-With: XMLHttpRequest`, the filename
/// coming from `qqfile`, `filename` or the `X-File-Name` header. Upload
/// failures are reported as `{"error": ...}` with status 200.
#[utoipa::path(
    post,
    path = "/api/admin/filer/clipboard/operations/upload/{folder_id}/",
    tag = "clipboard",
    params(
        ("folder_id" = i64, Path, description = "Target folder"),
        UploadQuery
    ),
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "A single file part, or a raw body for asynchronous uploaders",
    ),
    responses(
        (status = 200, description = "File uploaded, or upload error", body = UploadResponseDto),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Icons could not be generated", body = UploadErrorDto)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_to_folder(
    user: AuthenticatedUser,
    State(service): State<Arc<UploadService>>,
    Path(folder_id): Path<i64>,
    Query(query): Query<UploadQuery>,
    request: Request,
) -> Response {
    ajax_upload(&user, &service, Some(folder_id), query, request).await
}

/// Upload a file onto the uploader's clipboard
///
/// Same request and response shapes as the folder upload; the file is
/// created without a folder.
#[utoipa::path(
    post,
    path = "/api/admin/filer/clipboard/operations/upload/no_folder/",
    tag = "clipboard",
    params(UploadQuery),
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "A single file part, or a raw body for asynchronous uploaders",
    ),
    responses(
        (status = 200, description = "File uploaded, or upload error", body = UploadResponseDto),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Icons could not be generated", body = UploadErrorDto)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_without_folder(
    user: AuthenticatedUser,
    State(service): State<Arc<UploadService>>,
    Query(query): Query<UploadQuery>,
    request: Request,
) -> Response {
    ajax_upload(&user, &service, None, query, request).await
}

async fn ajax_upload(
    user: &AuthenticatedUser,
    service: &UploadService,
    folder_id: Option<i64>,
    query: UploadQuery,
    request: Request,
) -> Response {
    let is_ajax = is_ajax(request.headers());

    let result = match read_upload(request, query).await {
        Ok(upload) => service.upload(user, folder_id, upload).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(UploadOutcome::Created(body)) => upload_response(StatusCode::OK, &body, is_ajax),
        Ok(UploadOutcome::IconsUnavailable) => upload_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &UploadErrorDto {
                error: ICONS_UNAVAILABLE.to_string(),
            },
            is_ajax,
        ),
        Err(e) => {
            match &e {
                UploadError::Unexpected(msg) => warn!("Upload failed: {}", msg),
                other => debug!("Upload rejected: {}", other),
            }
            upload_response(
                StatusCode::OK,
                &UploadErrorDto {
                    error: e.to_string(),
                },
                is_ajax,
            )
        }
    }
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "XMLHttpRequest")
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// Decode the single uploaded file from either request encoding
async fn read_upload(request: Request, query: UploadQuery) -> Result<RawUpload, UploadError> {
    if request.method() != Method::POST {
        return Err(UploadError::not_post());
    }
    if is_multipart(request.headers()) {
        return read_multipart(request).await;
    }
    if !is_ajax(request.headers()) {
        return Err(UploadError::bad_upload());
    }

    let headers = request.headers();
    let filename = query
        .qqfile
        .or(query.filename)
        .or_else(|| {
            headers
                .get("x-file-name")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_default();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let data = Bytes::from_request(request, &())
        .await
        .map_err(|e| UploadError::Unexpected(format!("Failed to read upload body: {}", e)))?;

    Ok(RawUpload {
        filename,
        content_type,
        data: data.to_vec(),
    })
}

async fn read_multipart(request: Request) -> Result<RawUpload, UploadError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| UploadError::Unexpected(format!("Failed to read multipart data: {}", e)))?;

    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Unexpected(format!("Failed to read multipart data: {}", e)))?
    {
        // Plain form fields and empty file inputs carry no upload
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| UploadError::Unexpected(format!("Failed to read file data: {}", e)))?;

        uploads.push(RawUpload {
            filename,
            content_type,
            data: data.to_vec(),
        });
    }

    match uploads.pop() {
        Some(upload) if uploads.is_empty() => Ok(upload),
        _ => Err(UploadError::bad_upload()),
    }
}

fn upload_response<T: Serialize>(status: StatusCode, body: &T, is_ajax: bool) -> Response {
    let content_type = if is_ajax {
        "application/json"
    } else {
        "text/html; charset=utf-8"
    };

    match serde_json::to_string(body) {
        Ok(json) => (status, [(header::CONTENT_TYPE, content_type)], json).into_response(),
        Err(e) => {
            warn!("Failed to serialize upload response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
