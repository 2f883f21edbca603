use sqlx::FromRow;

use crate::features::auth::model::AuthenticatedUser;

/// Which folders a permission row reaches, relative to the folder it names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionScope {
    /// The folder and all of its descendants
    All,
    /// Only the folder itself
    This,
    /// Only the folder's descendants
    Children,
}

impl TryFrom<String> for PermissionScope {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "all" => Ok(PermissionScope::All),
            "this" => Ok(PermissionScope::This),
            "children" => Ok(PermissionScope::Children),
            other => Err(format!("Unknown folder permission type '{}'", other)),
        }
    }
}

/// Database model for folder permissions
#[derive(Debug, Clone, FromRow)]
pub struct FolderPermission {
    pub id: i64,
    /// `None` applies to every folder
    pub folder_id: Option<i64>,
    #[sqlx(rename = "type", try_from = "String")]
    pub scope: PermissionScope,
    pub user_id: Option<String>,
    pub group_name: Option<String>,
    pub everybody: bool,
    /// `None` inherits
    pub can_add_children: Option<bool>,
}

impl FolderPermission {
    /// Whether this row reaches `folder_id`, given that folder's ancestor ids
    pub fn covers(&self, folder_id: i64, ancestor_ids: &[i64]) -> bool {
        match self.folder_id {
            None => true,
            Some(id) if id == folder_id => {
                matches!(self.scope, PermissionScope::All | PermissionScope::This)
            }
            Some(id) if ancestor_ids.contains(&id) => {
                matches!(self.scope, PermissionScope::All | PermissionScope::Children)
            }
            Some(_) => false,
        }
    }

    pub fn applies_to_user(&self, user: &AuthenticatedUser) -> bool {
        self.everybody
            || self.user_id.as_deref() == Some(user.sub.as_str())
            || self
                .group_name
                .as_deref()
                .is_some_and(|group| user.has_role(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(folder_id: Option<i64>, scope: PermissionScope) -> FolderPermission {
        FolderPermission {
            id: 1,
            folder_id,
            scope,
            user_id: None,
            group_name: None,
            everybody: true,
            can_add_children: Some(true),
        }
    }

    #[test]
    fn test_global_row_covers_everything() {
        assert!(row(None, PermissionScope::This).covers(42, &[]));
    }

    #[test]
    fn test_scope_on_named_folder() {
        assert!(row(Some(5), PermissionScope::All).covers(5, &[]));
        assert!(row(Some(5), PermissionScope::This).covers(5, &[]));
        assert!(!row(Some(5), PermissionScope::Children).covers(5, &[]));
    }

    #[test]
    fn test_scope_on_descendants() {
        assert!(row(Some(1), PermissionScope::All).covers(5, &[3, 1]));
        assert!(row(Some(1), PermissionScope::Children).covers(5, &[3, 1]));
        assert!(!row(Some(1), PermissionScope::This).covers(5, &[3, 1]));
        assert!(!row(Some(9), PermissionScope::All).covers(5, &[3, 1]));
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!(
            PermissionScope::try_from("children".to_string()).unwrap(),
            PermissionScope::Children
        );
        assert!(PermissionScope::try_from("everything".to_string()).is_err());
    }
}
