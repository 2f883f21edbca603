mod generic_kind;
mod image_kind;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::models::FileType;

pub use generic_kind::GenericFileKind;
pub use image_kind::ImageKind;

/// What an upload request tells a kind besides the filename and bytes
pub struct UploadContext<'a> {
    pub user: &'a AuthenticatedUser,
    /// Content type declared by the client, if any
    pub content_type: Option<&'a str>,
}

/// A file subtype that can claim uploads
pub trait FileKind: Send + Sync {
    fn file_type(&self) -> FileType;

    fn matches_file_type(&self, filename: &str, payload: &[u8], context: &UploadContext<'_>)
        -> bool;
}

/// Lowercased extension including the dot, or empty
pub(crate) fn extension_of(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rfind('.') {
        // A leading dot marks a hidden file, not an extension
        Some(0) | None => String::new(),
        Some(idx) => base[idx..].to_lowercase(),
    }
}
