mod folder;
mod folder_permission;

pub use folder::Folder;
pub use folder_permission::{FolderPermission, PermissionScope};
