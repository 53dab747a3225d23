use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use chunkbox_store::chunk::{Chunk, LATEST_LIMIT, NewChunk};
use chunkbox_store::error::StoreError;
use chunkbox_store::store::ChunkStore;

use crate::config::PostgresStoreConfig;
use crate::migrations;

/// PostgreSQL-backed implementation of [`ChunkStore`].
///
/// Timestamps come from the database clock: `created` is `NOW()` at insert
/// time and reads filter with `WHERE expires > NOW()`, so the visibility rule
/// is evaluated by the server on every query.
pub struct PostgresChunkStore {
    pool: PgPool,
    table: String,
}

impl PostgresChunkStore {
    /// Create a new store, connecting to Postgres and running migrations.
    pub async fn new(config: &PostgresStoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        Self::from_pool(pool, config).await
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(
        pool: PgPool,
        config: &PostgresStoreConfig,
    ) -> Result<Self, StoreError> {
        let table = config.chunks_table();
        migrations::run_migrations(&pool, &table)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))?;
        debug!(table = %table, "postgres chunk store ready");

        Ok(Self { pool, table })
    }
}

#[async_trait]
impl ChunkStore for PostgresChunkStore {
    async fn insert(&self, chunk: NewChunk) -> Result<i64, StoreError> {
        chunk.validate()?;
        let days = i32::try_from(chunk.expires_days).map_err(|_| {
            StoreError::InvalidArgument(format!(
                "expires of {} days is out of range",
                chunk.expires_days
            ))
        })?;

        let sql = format!(
            r"
            INSERT INTO {} (title, content, created, expires)
            VALUES ($1, $2, NOW(), NOW() + make_interval(days => $3))
            RETURNING id
            ",
            self.table
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(&chunk.title)
            .bind(&chunk.content)
            .bind(days)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))
    }

    async fn get(&self, id: i64) -> Result<Chunk, StoreError> {
        let sql = format!(
            "SELECT id, title, content, created, expires FROM {} WHERE expires > NOW() AND id = $1",
            self.table
        );

        let row = sqlx::query_as::<_, ChunkRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        row.map(Into::into).ok_or(StoreError::NotFound)
    }

    async fn latest(&self) -> Result<Vec<Chunk>, StoreError> {
        let sql = format!(
            "SELECT id, title, content, created, expires FROM {} WHERE expires > NOW() \
             ORDER BY created DESC, id DESC LIMIT $1",
            self.table
        );

        #[allow(clippy::cast_possible_wrap)]
        let limit = LATEST_LIMIT as i64;

        let rows: Vec<ChunkRow> = sqlx::query_as::<_, ChunkRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Internal row type for mapping database rows to `Chunk`.
#[derive(sqlx::FromRow)]
struct ChunkRow {
    id: i64,
    title: String,
    content: String,
    created: chrono::DateTime<chrono::Utc>,
    expires: chrono::DateTime<chrono::Utc>,
}

impl From<ChunkRow> for Chunk {
    fn from(row: ChunkRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created: row.created,
            expires: row.expires,
        }
    }
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;

    fn test_config() -> PostgresStoreConfig {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost:5432/chunkbox_test".to_string());
        PostgresStoreConfig::new(url).with_prefix(format!("test_{}_", uuid::Uuid::new_v4().simple()))
    }

    #[tokio::test]
    async fn store_conformance() {
        let store = PostgresChunkStore::new(&test_config())
            .await
            .expect("pool creation should succeed");
        chunkbox_store::testing::run_store_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn first_insert_gets_id_one() {
        let store = PostgresChunkStore::new(&test_config())
            .await
            .expect("pool creation should succeed");
        let id = store
            .insert(NewChunk::new("On BhagvadGita", "content", 7))
            .await
            .unwrap();
        assert_eq!(id, 1);
        assert!(matches!(store.get(999).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn table_name_comes_from_config() {
        let config = test_config();
        let store = PostgresChunkStore::new(&config).await.unwrap();
        assert_eq!(store.table, config.chunks_table());
        assert!(store.table.starts_with(&config.table_prefix));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let config = test_config();
        let first = PostgresChunkStore::new(&config).await.unwrap();
        let id = first.insert(NewChunk::new("kept", "body", 1)).await.unwrap();

        let second = PostgresChunkStore::new(&config).await.unwrap();
        assert_eq!(second.get(id).await.unwrap().title, "kept");
    }
}
