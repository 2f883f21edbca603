mod clipboard_repository;

pub use clipboard_repository::{ClipboardRepository, PgClipboardRepository};
