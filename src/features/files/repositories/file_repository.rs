use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::config::FileModel;
use crate::core::error::Result;
use crate::features::files::models::{File, FileType, NewFile};

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create(&self, new_file: NewFile) -> Result<File>;

    async fn find_by_id(&self, id: i64) -> Result<Option<File>>;

    /// Files with the given ids, in id order; unknown ids are skipped
    async fn find_many(&self, ids: &[i64]) -> Result<Vec<File>>;

    async fn save_image_dimensions(&self, file_id: i64, width: u32, height: u32) -> Result<()>;

    /// Delete a file together with its image record and clipboard entries
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Postgres file repository over the table chosen by the deployment's file model
pub struct PgFileRepository {
    pool: PgPool,
    table: String,
}

const FILE_COLUMNS: &str = "id, polymorphic_type, folder_id, file_key, file_size, checksum, \
     original_filename, name, description, owner_id, is_public, uploaded_at, modified_at";

impl PgFileRepository {
    pub fn new(pool: PgPool, file_model: &FileModel) -> Self {
        Self {
            pool,
            table: file_model.table().to_string(),
        }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn create(&self, new_file: NewFile) -> Result<File> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO {} (polymorphic_type, folder_id, file_key, file_size, checksum,
                            original_filename, owner_id, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            self.table, FILE_COLUMNS
        );

        let file = sqlx::query_as::<_, File>(&sql)
            .bind(new_file.polymorphic_type.as_str())
            .bind(new_file.folder_id)
            .bind(&new_file.file_key)
            .bind(new_file.file_size)
            .bind(&new_file.checksum)
            .bind(&new_file.original_filename)
            .bind(&new_file.owner_id)
            .bind(new_file.is_public)
            .fetch_one(&mut *tx)
            .await?;

        if new_file.polymorphic_type == FileType::Image {
            sqlx::query("INSERT INTO filer_image (file_ptr_id) VALUES ($1)")
                .bind(file.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(file)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<File>> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", FILE_COLUMNS, self.table);

        let file = sqlx::query_as::<_, File>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<File>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ANY($1) ORDER BY id",
            FILE_COLUMNS, self.table
        );

        let files = sqlx::query_as::<_, File>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(files)
    }

    async fn save_image_dimensions(&self, file_id: i64, width: u32, height: u32) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO filer_image (file_ptr_id, width, height)
            VALUES ($1, $2, $3)
            ON CONFLICT (file_ptr_id) DO UPDATE SET width = EXCLUDED.width, height = EXCLUDED.height
            "#,
        )
        .bind(file_id)
        .bind(i32::try_from(width).unwrap_or(i32::MAX))
        .bind(i32::try_from(height).unwrap_or(i32::MAX))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM filer_clipboarditem WHERE file_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM filer_image WHERE file_ptr_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        let deleted = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }
}
