pub mod api;
pub mod config;
pub mod error;
pub mod store_factory;
pub mod telemetry;
pub mod templates;
