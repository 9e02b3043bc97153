//! Core library for the Wi-Fi survey scanner.
//! This crate defines the scan record model, the scan source adapter
//! (external OS tools with a degraded fallback), the record normalizer and
//! its derived metrics, and the polling view that owns the display collection.

pub mod backends;
pub mod collection;
pub mod config;
pub mod export;
pub mod interfaces;
pub mod metrics;
pub mod normalize;
pub mod permissions;
pub mod traits;
pub mod vendor;
pub mod view;
pub mod web_server;
pub mod worker;

// Define a shared Error and Result type for the entire crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tool not available: {0}")]
    ToolUnavailable(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Startup check failed: {0}")]
    Startup(String),

    #[error("Web server error: {0}")]
    WebServer(#[from] axum::BoxError),

    #[error("Scan view is no longer running")]
    ViewClosed,
}

/// A specialized `Result` type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;
