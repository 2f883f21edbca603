pub mod content_type;
pub mod kinds;
pub mod models;
pub mod registry;
pub mod repositories;
pub mod services;

pub use models::{File, FileType, NewFile};
pub use registry::FileTypeRegistry;
pub use repositories::{FileRepository, PgFileRepository};
pub use services::{FileService, ThumbnailService};
