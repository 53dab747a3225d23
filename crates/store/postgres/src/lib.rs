pub mod config;
pub mod migrations;
pub mod store;

pub use config::PostgresStoreConfig;
pub use store::PostgresChunkStore;
