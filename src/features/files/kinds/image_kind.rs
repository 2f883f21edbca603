use super::{extension_of, FileKind, UploadContext};
use crate::features::files::models::FileType;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// Raster images the thumbnailer can render; matched by extension only
pub struct ImageKind;

impl FileKind for ImageKind {
    fn file_type(&self) -> FileType {
        FileType::Image
    }

    fn matches_file_type(&self, filename: &str, _payload: &[u8], _context: &UploadContext<'_>) -> bool {
        IMAGE_EXTENSIONS.contains(&extension_of(filename).as_str())
    }
}
