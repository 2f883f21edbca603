use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::folders::models::{Folder, FolderPermission};

#[async_trait]
pub trait FolderRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Folder>>;

    /// Permission rows covering `folder`, directly or through an ancestor
    async fn permissions_for(&self, folder: &Folder) -> Result<Vec<FolderPermission>>;

    async fn can_add_children(
        &self,
        folder: &Folder,
        user: &AuthenticatedUser,
        permissions_enabled: bool,
    ) -> Result<bool> {
        if !permissions_enabled || user.is_superuser() || folder.is_owned_by(user) {
            return Ok(true);
        }
        let permissions = self.permissions_for(folder).await?;
        Ok(folder.has_add_children_permission(user, &permissions, permissions_enabled))
    }
}

pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            SELECT id, parent_id, name, owner_id, created_at, modified_at
            FROM filer_folder
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(folder)
    }

    async fn permissions_for(&self, folder: &Folder) -> Result<Vec<FolderPermission>> {
        let permissions = sqlx::query_as::<_, FolderPermission>(
            r#"
            WITH RECURSIVE ancestors AS (
                SELECT parent_id AS id FROM filer_folder WHERE id = $1
                UNION ALL
                SELECT f.parent_id FROM filer_folder f JOIN ancestors a ON f.id = a.id
            )
            SELECT p.id, p.folder_id, p.type, p.user_id, p.group_name, p.everybody,
                   p.can_add_children
            FROM filer_folderpermission p
            WHERE p.folder_id IS NULL
               OR (p.folder_id = $1 AND p.type IN ('all', 'this'))
               OR (p.folder_id IN (SELECT id FROM ancestors WHERE id IS NOT NULL)
                   AND p.type IN ('all', 'children'))
            ORDER BY p.id
            "#,
        )
        .bind(folder.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }
}
