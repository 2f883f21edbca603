use sqlx::FromRow;

use crate::features::auth::model::AuthenticatedUser;

/// Database model for a user's clipboard
#[derive(Debug, Clone, FromRow)]
pub struct Clipboard {
    pub id: i64,
    pub user_id: String,
}

impl Clipboard {
    /// Owners and superusers may operate on a clipboard
    pub fn is_accessible_by(&self, user: &AuthenticatedUser) -> bool {
        user.is_superuser() || self.user_id == user.sub
    }
}

/// Database model linking a clipboard to a file
#[derive(Debug, Clone, FromRow)]
pub struct ClipboardItem {
    pub id: i64,
    pub clipboard_id: i64,
    pub file_id: i64,
}
