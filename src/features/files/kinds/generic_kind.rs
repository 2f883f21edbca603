use super::{FileKind, UploadContext};
use crate::features::files::models::FileType;

/// Catch-all kind; accepts every upload
pub struct GenericFileKind;

impl FileKind for GenericFileKind {
    fn file_type(&self) -> FileType {
        FileType::File
    }

    fn matches_file_type(&self, _filename: &str, _payload: &[u8], _context: &UploadContext<'_>) -> bool {
        true
    }
}
