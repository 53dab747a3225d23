use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use chunkbox_server::api::AppState;
use chunkbox_server::config::ChunkboxConfig;
use chunkbox_server::templates::TemplateCache;

/// Chunkbox HTTP server.
#[derive(Parser, Debug)]
#[command(name = "chunkbox-server", about = "Pastebin server for short expiring text chunks")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "chunkbox.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the chunk table for the configured store backend, then exit.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config_exists = Path::new(&cli.config).exists();
    let config: ChunkboxConfig = if config_exists {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        ChunkboxConfig::default()
    };

    chunkbox_server::telemetry::init(&config.logging);

    if !config_exists {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    if let Some(Commands::Migrate) = cli.command {
        return run_migrate(&config).await;
    }

    let store = chunkbox_server::store_factory::create_store(&config.store).await?;
    info!(backend = %config.store.backend, "chunk store initialized");

    let templates = TemplateCache::load(&config.ui.templates_path)?;
    info!(
        path = %config.ui.templates_path,
        pages = templates.pages().len(),
        "templates loaded"
    );

    let state = AppState {
        store,
        templates: Arc::new(templates),
        static_path: Some(config.ui.static_path.clone()),
    };
    let app = chunkbox_server::api::router(state);

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "chunkbox-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM; in-flight requests
    // get at most `shutdown_timeout_seconds` to finish.
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    tokio::select! {
        result = server => result?,
        () = drain_deadline(shutdown_timeout) => {
            warn!(
                timeout_secs = config.server.shutdown_timeout_seconds,
                "shutdown timeout exceeded, dropping in-flight requests"
            );
        }
    }

    info!("chunkbox-server shut down");
    Ok(())
}

/// Run the `migrate` subcommand: initialize the store schema and exit.
async fn run_migrate(config: &ChunkboxConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(backend = %config.store.backend, "running store migrations...");
    let _store = chunkbox_server::store_factory::create_store(&config.store).await?;
    info!(backend = %config.store.backend, "store migrations complete");
    Ok(())
}

/// Resolves `timeout` after the first shutdown signal; never resolves before.
async fn drain_deadline(timeout: Duration) {
    shutdown_signal().await;
    tokio::time::sleep(timeout).await;
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
