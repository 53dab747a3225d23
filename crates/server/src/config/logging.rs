use serde::Deserialize;

/// Log output configuration.
///
/// # Example
///
/// ```toml
/// [logging]
/// filter = "chunkbox_server=debug,tower_http=info"
/// ansi = false
/// ```
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Whether to colorize output.
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            ansi: default_ansi(),
        }
    }
}

fn default_filter() -> String {
    "info".to_owned()
}

fn default_ansi() -> bool {
    true
}
