use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

/// Longest filename a file row can store
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Field order used when summarising form errors
pub const UPLOAD_FORM_FIELDS: &[&str] = &["original_filename", "owner", "file"];

/// Query parameters accepted by the upload routes
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// Filename sent by fine-uploader style clients
    pub qqfile: Option<String>,
    /// Filename sent by other raw-body clients
    pub filename: Option<String>,
}

/// Uploaded payload as seen by the form
#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub name: String,
    pub size: usize,
}

/// Form every upload is validated against before a row is written
#[derive(Debug, Validate)]
pub struct UploadForm {
    #[validate(length(
        max = 255,
        message = "Ensure this value has at most 255 characters."
    ))]
    pub original_filename: String,

    #[validate(length(min = 1, message = "This field is required."))]
    pub owner: String,

    #[validate(custom(function = "validate_uploaded_file"))]
    pub file: UploadedFile,
}

impl UploadForm {
    pub fn new(filename: &str, owner: &str, size: usize) -> Self {
        Self {
            original_filename: filename.to_string(),
            owner: owner.to_string(),
            file: UploadedFile {
                name: filename.to_string(),
                size,
            },
        }
    }
}

fn validate_uploaded_file(file: &UploadedFile) -> Result<(), ValidationError> {
    if file.name.is_empty() {
        return Err(ValidationError::new("invalid").with_message(Cow::Borrowed(
            "No file was submitted. Check the encoding type on the form.",
        )));
    }

    let length = file.name.chars().count();
    if length > MAX_FILENAME_LENGTH {
        return Err(
            ValidationError::new("max_length").with_message(Cow::Owned(format!(
                "Ensure this filename has at most {} characters (it has {}).",
                MAX_FILENAME_LENGTH, length
            ))),
        );
    }

    if file.size == 0 {
        return Err(ValidationError::new("empty")
            .with_message(Cow::Borrowed("The submitted file is empty.")));
    }

    Ok(())
}

/// `field: msg, msg; field: msg` in form field order
pub fn form_errors_summary(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();

    UPLOAD_FORM_FIELDS
        .iter()
        .filter_map(|field| {
            let messages = field_errors.get(*field)?;
            let joined = messages
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!("{}: {}", field, joined))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Body returned after a successful upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    /// Icon URL shown in the admin listing, null when no candidate size exists
    pub thumbnail: Option<String>,
    pub alt_text: String,
    pub label: String,
    pub file_id: i64,
    /// Square 180px preview, images only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_180: Option<String>,
    /// URL of the uploaded original, images only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_image: Option<String>,
}

/// Body returned when an upload fails
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadErrorDto {
    pub error: String,
}

/// Multipart upload body, for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload; exactly one file part is accepted
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}
