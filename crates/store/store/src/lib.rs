pub mod chunk;
pub mod error;
pub mod store;
pub mod testing;

pub use chunk::{Chunk, LATEST_LIMIT, NewChunk};
pub use error::StoreError;
pub use store::ChunkStore;
