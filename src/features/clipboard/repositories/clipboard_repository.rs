use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::config::FileModel;
use crate::core::error::Result;
use crate::features::clipboard::models::{Clipboard, ClipboardItem};

#[async_trait]
pub trait ClipboardRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Clipboard>>;

    async fn get_or_create_for_user(&self, user_id: &str) -> Result<Clipboard>;

    /// Items on a clipboard in the order they were added
    async fn items(&self, clipboard_id: i64) -> Result<Vec<ClipboardItem>>;

    /// Add a file; adding it twice keeps a single item
    async fn add_file(&self, clipboard_id: i64, file_id: i64) -> Result<()>;

    /// Remove every item, returning how many were removed
    async fn clear(&self, clipboard_id: i64) -> Result<u64>;

    /// Move the clipboard's files into a folder and empty it, atomically.
    /// Returns how many files moved.
    async fn paste_into_folder(&self, clipboard_id: i64, folder_id: i64) -> Result<u64>;
}

pub struct PgClipboardRepository {
    pool: PgPool,
    file_table: String,
}

impl PgClipboardRepository {
    pub fn new(pool: PgPool, file_model: &FileModel) -> Self {
        Self {
            pool,
            file_table: file_model.table().to_string(),
        }
    }
}

#[async_trait]
impl ClipboardRepository for PgClipboardRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Clipboard>> {
        let clipboard =
            sqlx::query_as::<_, Clipboard>("SELECT id, user_id FROM filer_clipboard WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(clipboard)
    }

    async fn get_or_create_for_user(&self, user_id: &str) -> Result<Clipboard> {
        // The no-op update makes RETURNING yield the existing row too
        let clipboard = sqlx::query_as::<_, Clipboard>(
            r#"
            INSERT INTO filer_clipboard (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(clipboard)
    }

    async fn items(&self, clipboard_id: i64) -> Result<Vec<ClipboardItem>> {
        let items = sqlx::query_as::<_, ClipboardItem>(
            r#"
            SELECT id, clipboard_id, file_id
            FROM filer_clipboarditem
            WHERE clipboard_id = $1
            ORDER BY id
            "#,
        )
        .bind(clipboard_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn add_file(&self, clipboard_id: i64, file_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO filer_clipboarditem (clipboard_id, file_id)
            VALUES ($1, $2)
            ON CONFLICT (clipboard_id, file_id) DO NOTHING
            "#,
        )
        .bind(clipboard_id)
        .bind(file_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear(&self, clipboard_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM filer_clipboarditem WHERE clipboard_id = $1")
            .bind(clipboard_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn paste_into_folder(&self, clipboard_id: i64, folder_id: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE {} SET folder_id = $1, modified_at = NOW()
            WHERE id IN (SELECT file_id FROM filer_clipboarditem WHERE clipboard_id = $2)
            "#,
            self.file_table
        );
        let moved = sqlx::query(&sql)
            .bind(folder_id)
            .bind(clipboard_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM filer_clipboarditem WHERE clipboard_id = $1")
            .bind(clipboard_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(moved)
    }
}
