pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use error::UploadError;
pub use repositories::{ClipboardRepository, PgClipboardRepository};
pub use routes::ClipboardAdmin;
pub use services::{ClipboardService, UploadService};
