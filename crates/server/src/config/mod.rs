mod logging;
mod server;
mod store;
mod ui;


pub use logging::*;
pub use server::*;
pub use store::*;
pub use ui::*;

use serde::Deserialize;

/// Top-level configuration for the Chunkbox server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct ChunkboxConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Chunk store backend configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Template and static asset locations.
    #[serde(default)]
    pub ui: UiConfig,
    /// Log output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}
