use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::admin::model_admin::ModelPermissions;

/// Entry of the admin index
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminModelDto {
    pub model_name: String,
    pub verbose_name: String,
    /// Mount point of the model's routes
    pub url: String,
    pub permissions: ModelPermissions,
}
