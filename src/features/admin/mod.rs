pub mod dtos;
pub mod handlers;
pub mod model_admin;
pub mod routes;

pub use model_admin::{ModelAdmin, ModelPermissions};
pub use routes::AdminSite;
