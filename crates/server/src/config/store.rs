use serde::Deserialize;

/// Configuration for the chunk store backend.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Which backend to use: `"memory"` or `"postgres"`.
    #[serde(default = "default_store_backend")]
    pub backend: String,
    /// Connection URL for the backend (required by `postgres`).
    pub url: Option<String>,
    /// Table prefix for the backend.
    #[serde(default = "default_store_prefix")]
    pub prefix: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            url: None,
            prefix: default_store_prefix(),
            pool_size: default_pool_size(),
        }
    }
}

fn default_store_backend() -> String {
    "memory".to_owned()
}

fn default_store_prefix() -> String {
    "chunkbox_".to_owned()
}

fn default_pool_size() -> u32 {
    5
}
