mod clipboard_service;
mod upload_service;

pub use clipboard_service::ClipboardService;
pub use upload_service::{RawUpload, UploadOutcome, UploadService};
