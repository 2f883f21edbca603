use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::admin::dtos::AdminModelDto;
use crate::features::admin::routes::AdminSite;
use crate::features::auth::guards::RequireStaff;
use crate::shared::types::{ApiResponse, Meta};

/// List the models shown on the admin index
#[utoipa::path(
    get,
    path = "/api/admin/filer/",
    responses(
        (status = 200, description = "Registered models with at least one permission", body = ApiResponse<Vec<AdminModelDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Staff access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_index(
    RequireStaff(_user): RequireStaff,
    State(site): State<Arc<AdminSite>>,
) -> Result<Json<ApiResponse<Vec<AdminModelDto>>>> {
    let models = site.index();
    let total = models.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(models),
        None,
        Some(Meta { total }),
    )))
}
