use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Form for moving a clipboard's files into a folder
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasteClipboardDto {
    pub clipboard_id: i64,
    pub folder_id: i64,
    /// Local path to redirect to afterwards
    #[validate(custom(function = "validate_redirect_to"))]
    pub redirect_to: Option<String>,
}

/// Form for the discard and delete clipboard operations
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ClipboardActionDto {
    pub clipboard_id: i64,
    /// Local path to redirect to afterwards
    #[validate(custom(function = "validate_redirect_to"))]
    pub redirect_to: Option<String>,
}

/// Result of a clipboard operation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClipboardOperationDto {
    pub clipboard_id: i64,
    /// Files moved, unlinked or deleted
    pub affected_files: u64,
}

/// Only same-site paths are accepted as redirect targets. Browsers treat
/// `/\host` like `//host`.
fn validate_redirect_to(redirect_to: &str) -> Result<(), ValidationError> {
    if redirect_to.is_empty() {
        return Ok(());
    }

    let mut chars = redirect_to.chars();
    let local = chars.next() == Some('/')
        && !matches!(chars.next(), Some('/') | Some('\\'))
        && !redirect_to.chars().any(char::is_control);

    if local {
        Ok(())
    } else {
        Err(ValidationError::new("redirect_to")
            .with_message("redirect_to must be a local path".into()))
    }
}

/// The redirect target, ignoring an empty value
pub fn redirect_target(redirect_to: &Option<String>) -> Option<&str> {
    redirect_to.as_deref().filter(|target| !target.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(redirect_to: Option<&str>) -> ClipboardActionDto {
        ClipboardActionDto {
            clipboard_id: 1,
            redirect_to: redirect_to.map(str::to_string),
        }
    }

    #[test]
    fn test_redirect_must_be_local() {
        assert!(action(None).validate().is_ok());
        assert!(action(Some("")).validate().is_ok());
        assert!(action(Some("/admin/filer/folder/3/")).validate().is_ok());
        assert!(action(Some("https://evil.example/")).validate().is_err());
        assert!(action(Some("//evil.example/")).validate().is_err());
        assert!(action(Some("/\\evil.example/")).validate().is_err());
        assert!(action(Some("/\t/evil.example/")).validate().is_err());
        assert!(action(Some("/admin/\r\nLocation: x")).validate().is_err());
        assert!(action(Some("/")).validate().is_ok());
    }

    #[test]
    fn test_empty_redirect_is_ignored() {
        assert_eq!(redirect_target(&Some(String::new())), None);
        assert_eq!(redirect_target(&Some("/x/".into())), Some("/x/"));
    }
}
