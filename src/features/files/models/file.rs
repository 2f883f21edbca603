use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Concrete kind a file row represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Image,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::File => "file",
            FileType::Image => "image",
        }
    }
}

// Rows written before the discriminator existed carry NULL and are plain files
impl TryFrom<Option<String>> for FileType {
    type Error = String;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        match value.as_deref() {
            None | Some("file") => Ok(FileType::File),
            Some("image") => Ok(FileType::Image),
            Some(other) => Err(format!("Unknown file type '{}'", other)),
        }
    }
}

/// Database model for files
#[derive(Debug, Clone, FromRow)]
pub struct File {
    pub id: i64,
    #[sqlx(try_from = "Option<String>")]
    pub polymorphic_type: FileType,
    pub folder_id: Option<i64>,
    pub file_key: String,
    pub file_size: i64,
    pub checksum: String,
    pub original_filename: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Option<String>,
    pub is_public: bool,
    pub uploaded_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl File {
    /// Display label: the explicit name, falling back to the uploaded filename
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.original_filename
        } else {
            &self.name
        }
    }

    pub fn is_image(&self) -> bool {
        self.polymorphic_type == FileType::Image
    }
}

/// Values for inserting a file row
#[derive(Debug, Clone)]
pub struct NewFile {
    pub polymorphic_type: FileType,
    pub folder_id: Option<i64>,
    pub file_key: String,
    pub file_size: i64,
    pub checksum: String,
    pub original_filename: String,
    pub owner_id: String,
    pub is_public: bool,
}
