mod clipboard_dto;
mod upload_dto;

pub use clipboard_dto::*;
pub use upload_dto::*;
