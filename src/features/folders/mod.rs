pub mod models;
pub mod repositories;

pub use models::{Folder, FolderPermission};
pub use repositories::{FolderRepository, PgFolderRepository};
