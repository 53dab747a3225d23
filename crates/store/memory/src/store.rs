use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use chunkbox_store::chunk::{Chunk, LATEST_LIMIT, NewChunk};
use chunkbox_store::error::StoreError;
use chunkbox_store::store::ChunkStore;

/// In-memory [`ChunkStore`] backed by a [`DashMap`]. Suitable for development
/// and testing.
///
/// Identifiers come from an atomic sequence starting at 1. Expired chunks are
/// kept in the map and filtered out on every read.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    chunks: DashMap<i64, Chunk>,
    last_id: AtomicI64,
}

impl MemoryChunkStore {
    /// Create a new, empty in-memory chunk store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chunks, expired ones included.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if nothing has ever been inserted.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn insert(&self, chunk: NewChunk) -> Result<i64, StoreError> {
        chunk.validate()?;

        let created = Utc::now();
        let expires = chunk.expiry_from(created)?;
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;

        self.chunks.insert(
            id,
            Chunk {
                id,
                title: chunk.title,
                content: chunk.content,
                created,
                expires,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Chunk, StoreError> {
        let now = Utc::now();
        self.chunks
            .get(&id)
            .filter(|entry| entry.value().is_visible_at(now))
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn latest(&self) -> Result<Vec<Chunk>, StoreError> {
        let now = Utc::now();
        let mut visible: Vec<Chunk> = self
            .chunks
            .iter()
            .filter(|entry| entry.value().is_visible_at(now))
            .map(|entry| entry.value().clone())
            .collect();

        visible.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        visible.truncate(LATEST_LIMIT);
        Ok(visible)
    }
}
