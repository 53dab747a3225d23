mod store;

pub use store::MemoryChunkStore;
