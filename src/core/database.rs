use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config::{DatabaseConfig, FileModel};

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// A schema change that only applies to some deployments
pub struct SchemaStep {
    pub name: &'static str,
    pub applies: fn(&FileModel) -> bool,
    pub sql: &'static str,
}

/// Steps run after the embedded migrations, in order.
pub const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    name: "0002_file_polymorphic_type_nullable",
    // A substituted file table owns its own schema
    applies: FileModel::is_builtin,
    sql: "ALTER TABLE filer_file ALTER COLUMN polymorphic_type DROP NOT NULL",
}];

/// Names of the steps that apply to the given file model
pub fn pending_steps(file_model: &FileModel) -> Vec<&'static SchemaStep> {
    SCHEMA_STEPS
        .iter()
        .filter(|step| (step.applies)(file_model))
        .collect()
}

/// Run the embedded migrations, then the conditional schema steps
pub async fn run_migrations(pool: &PgPool, file_model: &FileModel) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS filer_schema_steps (
            name TEXT PRIMARY KEY,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    for step in pending_steps(file_model) {
        let mut tx = pool.begin().await?;

        let claimed = sqlx::query(
            "INSERT INTO filer_schema_steps (name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
        )
        .bind(step.name)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if claimed == 0 {
            debug!("Schema step {} already applied", step.name);
            tx.rollback().await?;
            continue;
        }

        sqlx::query(step.sql).execute(&mut *tx).await?;
        tx.commit().await?;
        info!("Applied schema step {}", step.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminator_step_only_for_builtin_model() {
        let builtin = pending_steps(&FileModel::Builtin);
        assert_eq!(builtin.len(), 1);
        assert_eq!(builtin[0].name, "0002_file_polymorphic_type_nullable");

        let custom = pending_steps(&FileModel::Custom("media_asset".to_string()));
        assert!(custom.is_empty());
    }
}
