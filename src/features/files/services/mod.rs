mod file_service;
mod thumbnail_service;

pub use file_service::{FileService, StoreFile};
pub use thumbnail_service::{select_icon, RenderedIcons, ThumbnailService};
