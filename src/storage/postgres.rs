//! PostgreSQL relational store backed by a sqlx `PgPool`.

use super::errors::{StorageError, StorageResult};
use super::relational::{quote_identifier, RelationalStore};
use crate::config::DatabaseConfig;
use crate::models::TagSet;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tracing::debug;

pub struct PgRelationalStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgRelationalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgRelationalStore")
            .field("pool", &"PgPool")
            .finish()
    }
}

impl PgRelationalStore {
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool that connects on first use
    pub fn connect_lazy(config: &DatabaseConfig) -> StorageResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StorageError::driver("database.url is not configured"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_lazy(url)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RelationalStore for PgRelationalStore {
    async fn list_tables(&self) -> StorageResult<Vec<String>> {
        let tables = sqlx::query_scalar::<_, String>(
            "SELECT tablename::text FROM pg_catalog.pg_tables \
             WHERE schemaname = current_schema() ORDER BY tablename",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    async fn truncate(&self, table: &str) -> StorageResult<()> {
        let quoted = quote_identifier(table)?;
        let start = Instant::now();
        sqlx::query(&format!("TRUNCATE TABLE {quoted}"))
            .execute(&self.pool)
            .await?;
        debug!(
            table = table,
            duration_ms = start.elapsed().as_millis() as u64,
            "Truncated table"
        );
        Ok(())
    }

    async fn delete_tagged(
        &self,
        entries_table: &str,
        tags_table: &str,
        tags: &TagSet,
    ) -> StorageResult<u64> {
        let entries = quote_identifier(entries_table)?;
        let tag_rows = quote_identifier(tags_table)?;
        let tags = tags.to_vec();

        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query(&format!(
            "DELETE FROM {entries} WHERE identifier IN \
             (SELECT identifier FROM {tag_rows} WHERE tag = ANY($1))"
        ))
        .bind(tags.clone())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(&format!("DELETE FROM {tag_rows} WHERE tag = ANY($1)"))
            .bind(tags)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(removed)
    }

    fn driver_name(&self) -> &'static str {
        "postgres"
    }
}
