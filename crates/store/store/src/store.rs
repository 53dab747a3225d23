use async_trait::async_trait;

use crate::chunk::{Chunk, NewChunk};
use crate::error::StoreError;

/// Trait for chunk storage backends.
///
/// Implementations must be `Send + Sync` to be shared across async tasks.
/// Visibility (`now < expires`) is evaluated against the current time on
/// every call; backends must not cache it.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Persist a new chunk and return its identifier.
    ///
    /// `created` is stamped by the store and `expires` is derived as
    /// `created + expires_days` days.
    async fn insert(&self, chunk: NewChunk) -> Result<i64, StoreError>;

    /// Fetch a visible chunk by identifier.
    ///
    /// Missing and expired chunks both yield [`StoreError::NotFound`].
    async fn get(&self, id: i64) -> Result<Chunk, StoreError>;

    /// Up to [`LATEST_LIMIT`](crate::LATEST_LIMIT) visible chunks, newest first.
    async fn latest(&self) -> Result<Vec<Chunk>, StoreError>;
}
