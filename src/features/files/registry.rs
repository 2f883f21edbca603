use super::kinds::{FileKind, GenericFileKind, ImageKind, UploadContext};
use super::models::FileType;

/// Ordered file kinds; the first kind accepting an upload decides its type.
pub struct FileTypeRegistry {
    kinds: Vec<Box<dyn FileKind>>,
}

/// Look up a built-in kind by its configured name
fn kind_for_name(name: &str) -> Option<Box<dyn FileKind>> {
    match name {
        "image" => Some(Box::new(ImageKind)),
        "file" => Some(Box::new(GenericFileKind)),
        _ => None,
    }
}

impl FileTypeRegistry {
    pub fn new(kinds: Vec<Box<dyn FileKind>>) -> Self {
        Self { kinds }
    }

    /// Build the registry from configured kind names, keeping their order
    pub fn from_names(names: &[String]) -> Result<Self, String> {
        if names.is_empty() {
            return Err("FILER_FILE_MODELS must name at least one file kind".to_string());
        }

        let kinds = names
            .iter()
            .map(|name| {
                kind_for_name(name).ok_or_else(|| {
                    format!(
                        "Unknown file kind '{}' in FILER_FILE_MODELS (known: image, file)",
                        name
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(kinds))
    }

    pub fn resolve(
        &self,
        filename: &str,
        payload: &[u8],
        context: &UploadContext<'_>,
    ) -> Option<FileType> {
        self.kinds
            .iter()
            .find(|kind| kind.matches_file_type(filename, payload, context))
            .map(|kind| kind.file_type())
    }

    pub fn file_types(&self) -> Vec<FileType> {
        self.kinds.iter().map(|kind| kind.file_type()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::create_staff_user;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = FileTypeRegistry::from_names(&names(&["image", "file"])).unwrap();
        assert_eq!(registry.file_types(), vec![FileType::Image, FileType::File]);
    }

    #[test]
    fn test_first_match_wins() {
        let user = create_staff_user();
        let ctx = UploadContext {
            user: &user,
            content_type: None,
        };

        let image_first = FileTypeRegistry::from_names(&names(&["image", "file"])).unwrap();
        assert_eq!(
            image_first.resolve("cat.png", b"", &ctx),
            Some(FileType::Image)
        );
        assert_eq!(
            image_first.resolve("notes.txt", b"", &ctx),
            Some(FileType::File)
        );

        // The catch-all shadows everything registered after it
        let file_first = FileTypeRegistry::from_names(&names(&["file", "image"])).unwrap();
        assert_eq!(file_first.resolve("cat.png", b"", &ctx), Some(FileType::File));
    }

    #[test]
    fn test_no_match_without_catch_all() {
        let user = create_staff_user();
        let ctx = UploadContext {
            user: &user,
            content_type: None,
        };
        let registry = FileTypeRegistry::from_names(&names(&["image"])).unwrap();
        assert_eq!(registry.resolve("notes.txt", b"hello", &ctx), None);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(FileTypeRegistry::from_names(&[]).is_err());
        assert!(FileTypeRegistry::from_names(&names(&["image", "video"])).is_err());
    }
}
