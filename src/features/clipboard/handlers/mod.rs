mod clipboard_handler;
mod upload_handler;

pub use clipboard_handler::*;
pub use upload_handler::*;
