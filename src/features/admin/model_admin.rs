use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which admin actions a model exposes in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModelPermissions {
    pub add: bool,
    pub change: bool,
    pub delete: bool,
}

impl ModelPermissions {
    pub const ALL: ModelPermissions = ModelPermissions {
        add: true,
        change: true,
        delete: true,
    };

    pub const NONE: ModelPermissions = ModelPermissions {
        add: false,
        change: false,
        delete: false,
    };

    /// Models with no permission at all are left out of the index
    pub fn any(&self) -> bool {
        self.add || self.change || self.delete
    }
}

/// A model registered on the admin site.
///
/// Its routes are mounted under `<admin prefix>/<model_name>`.
pub trait ModelAdmin: Send + Sync {
    fn model_name(&self) -> &'static str;

    fn verbose_name(&self) -> &'static str;

    fn model_perms(&self) -> ModelPermissions {
        ModelPermissions::ALL
    }

    /// Routes relative to the model's mount point
    fn routes(&self) -> Router;
}
