//! Grabber: a declarative web grabber
//!
//! This crate interprets rule files describing "targets" (a start page plus a
//! tree of query actions), walks the linked pages, and prints, logs or
//! downloads the URLs it extracts.

pub mod config;
pub mod crawler;
pub mod download;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for grabber operations
#[derive(Debug, Error)]
pub enum GrabError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Invalid query '{query}': {message}")]
    Query { query: String, message: String },

    #[error("{url}: no results")]
    NoResults { url: String },

    #[error("{url}: no results for '{query}' but nested actions expect content")]
    MissingContent { url: String, query: String },

    #[error("Unknown mode '{0}'")]
    UnknownMode(String),

    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error("Bailout after {count}")]
    Bailout { count: u32 },

    #[error("Cannot parse match '{raw}': {source}")]
    InvalidMatch {
        raw: String,
        source: ::url::ParseError,
    },

    #[error("{url}: match '{raw}' does not lead to a page")]
    UnresolvedMatch { url: String, raw: String },

    #[error("Stopped following after {limit} pages at {url}")]
    FollowLimit { limit: usize, url: String },

    #[error("Download queue is closed")]
    QueueClosed,

    #[error("No file name in {url}")]
    NoFileName { url: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for grabber operations
pub type Result<T> = std::result::Result<T, GrabError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Action, ActionKind, GrabberConfig, Mode, Target};
pub use crawler::{run_targets, RunReport};
pub use output::Stats;
pub use state::BailCounter;
