use thiserror::Error;

use crate::core::error::AppError;

/// Every way an upload request can fail before a file is created.
///
/// These are reported to the uploader as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Can't find folder to upload. Please refresh and try again")]
    FolderNotFound,

    #[error("Can't use this folder, Permission Denied. Please select another folder.")]
    PermissionDenied,

    #[error("No file type accepts '{0}'")]
    SubtypeUnresolved(String),

    #[error("AJAX request not valid: form invalid '{0}'")]
    FormInvalid(String),

    #[error("{0}")]
    Unexpected(String),
}

impl UploadError {
    pub fn not_post() -> Self {
        UploadError::Unexpected("AJAX request not valid: must be POST".to_string())
    }

    pub fn bad_upload() -> Self {
        UploadError::Unexpected("AJAX request not valid: Bad Upload".to_string())
    }
}

impl From<AppError> for UploadError {
    fn from(err: AppError) -> Self {
        UploadError::Unexpected(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            UploadError::FolderNotFound.to_string(),
            "Can't find folder to upload. Please refresh and try again"
        );
        assert_eq!(
            UploadError::FormInvalid("owner: This field is required.".into()).to_string(),
            "AJAX request not valid: form invalid 'owner: This field is required.'"
        );
        assert_eq!(
            UploadError::bad_upload().to_string(),
            "AJAX request not valid: Bad Upload"
        );
    }

    #[test]
    fn test_app_errors_become_unexpected() {
        let err: UploadError = AppError::Storage("bucket gone".into()).into();
        assert!(matches!(err, UploadError::Unexpected(_)));
    }
}
