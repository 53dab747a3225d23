use std::sync::Arc;

use chunkbox_store::ChunkStore;
use chunkbox_store_memory::MemoryChunkStore;
#[cfg(feature = "postgres")]
use chunkbox_store_postgres::{PostgresChunkStore, PostgresStoreConfig};

use crate::config::StoreConfig;
use crate::error::ServerError;

/// Create a chunk store from the given configuration.
#[allow(clippy::unused_async)]
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn ChunkStore>, ServerError> {
    let store: Arc<dyn ChunkStore> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryChunkStore::new()),
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = config.url.as_deref().ok_or_else(|| {
                ServerError::Config("postgres store backend requires [store] url".into())
            })?;

            let pg_config = PostgresStoreConfig::new(url)
                .with_prefix(&config.prefix)
                .with_pool_size(config.pool_size);

            let store = PostgresChunkStore::new(&pg_config)
                .await
                .map_err(|e| ServerError::Config(format!("store postgres: {e}")))?;

            Arc::new(store)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unknown store backend: {other} (is the feature enabled?)"
            )));
        }
    };

    Ok(store)
}
