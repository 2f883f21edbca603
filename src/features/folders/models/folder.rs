use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::folders::models::FolderPermission;

/// Database model for folders
#[derive(Debug, Clone, FromRow)]
pub struct Folder {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Folder {
    pub fn is_owned_by(&self, user: &AuthenticatedUser) -> bool {
        self.owner_id.as_deref() == Some(user.sub.as_str())
    }

    /// Whether `user` may place files and subfolders in this folder.
    ///
    /// `permissions` are the rows covering this folder (see
    /// [`FolderPermission::covers`]); rows for other actors are ignored here.
    /// An explicit deny wins over any allow.
    pub fn has_add_children_permission(
        &self,
        user: &AuthenticatedUser,
        permissions: &[FolderPermission],
        permissions_enabled: bool,
    ) -> bool {
        if !permissions_enabled || user.is_superuser() || self.is_owned_by(user) {
            return true;
        }

        let mut allowed = false;
        for permission in permissions.iter().filter(|p| p.applies_to_user(user)) {
            match permission.can_add_children {
                Some(false) => return false,
                Some(true) => allowed = true,
                None => {}
            }
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::folders::models::PermissionScope;
    use crate::shared::test_helpers::{create_staff_user, create_superuser, make_folder};

    fn grant(user_id: Option<&str>, everybody: bool, can_add: Option<bool>) -> FolderPermission {
        FolderPermission {
            id: 1,
            folder_id: Some(1),
            scope: PermissionScope::All,
            user_id: user_id.map(str::to_string),
            group_name: None,
            everybody,
            can_add_children: can_add,
        }
    }

    #[test]
    fn test_permissions_disabled_allows_everyone() {
        let folder = make_folder(1, None, Some("someone-else"));
        assert!(folder.has_add_children_permission(&create_staff_user(), &[], false));
    }

    #[test]
    fn test_superuser_and_owner_always_allowed() {
        let folder = make_folder(1, None, Some("test-staff"));
        assert!(folder.has_add_children_permission(&create_superuser(), &[], true));
        assert!(folder.has_add_children_permission(&create_staff_user(), &[], true));
    }

    #[test]
    fn test_no_matching_grant_denies() {
        let folder = make_folder(1, None, Some("someone-else"));
        let rows = vec![grant(Some("another-user"), false, Some(true))];
        assert!(!folder.has_add_children_permission(&create_staff_user(), &rows, true));
    }

    #[test]
    fn test_user_and_everybody_grants_allow() {
        let folder = make_folder(1, None, Some("someone-else"));
        let user = create_staff_user();

        let direct = vec![grant(Some("test-staff"), false, Some(true))];
        assert!(folder.has_add_children_permission(&user, &direct, true));

        let everybody = vec![grant(None, true, Some(true))];
        assert!(folder.has_add_children_permission(&user, &everybody, true));
    }

    #[test]
    fn test_group_grant_matches_role() {
        let folder = make_folder(1, None, Some("someone-else"));
        let mut row = grant(None, false, Some(true));
        row.group_name = Some("staff".to_string());
        assert!(folder.has_add_children_permission(&create_staff_user(), &[row], true));
    }

    #[test]
    fn test_deny_wins_over_allow() {
        let folder = make_folder(1, None, Some("someone-else"));
        let rows = vec![
            grant(None, true, Some(true)),
            grant(Some("test-staff"), false, Some(false)),
        ];
        assert!(!folder.has_add_children_permission(&create_staff_user(), &rows, true));
    }

    #[test]
    fn test_inherit_rows_are_neutral() {
        let folder = make_folder(1, None, Some("someone-else"));
        let rows = vec![grant(Some("test-staff"), false, None)];
        assert!(!folder.has_add_children_permission(&create_staff_user(), &rows, true));
    }
}
