use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_STAFF, ROLE_SUPERUSER};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub account_id: String,
    /// Subject id; owner of uploaded files and clipboards
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_uid: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_superuser(&self) -> bool {
        self.has_role(ROLE_SUPERUSER)
    }

    /// Staff may use the admin surface; superusers always can
    pub fn is_staff(&self) -> bool {
        self.is_superuser() || self.has_role(ROLE_STAFF)
    }
}

/// Custom claims carried under the configured namespace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomClaims {
    #[serde(default)]
    pub roles: Vec<String>,
}
