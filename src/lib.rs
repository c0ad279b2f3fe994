//! Wikirace: bidirectional link racing across an online encyclopedia
//!
//! This crate finds a chain of hyperlinks between two pages by running a
//! heuristic best-first search from both ends at once. Several forward
//! crawlers expand outward from the start page, one backward crawler expands
//! outward from the end page, and the race stops as soon as either side
//! learns a title the other side has already discovered.

pub mod api;
pub mod config;
pub mod provider;
pub mod race;
pub mod state;

use thiserror::Error;

/// Main error type for Wikirace operations
#[derive(Debug, Error)]
pub enum WikiraceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Link provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Path reconstruction error: {0}")]
    Path(#[from] PathError),

    #[error("Crawler task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while talking to the link provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error while {context}: {source}")]
    Http {
        context: String,
        source: reqwest::Error,
    },

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<ProviderError>,
    },
}

/// Invalid race parameters supplied by a caller
///
/// The display strings are the messages returned to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("please specify a start page")]
    MissingStart,

    #[error("please specify a end page")]
    MissingEnd,

    #[error("invalid timeout - timeout could not be read as int")]
    TimeoutNotInteger(String),

    #[error("invalid timeout - please specify a timeout between 1 and 999")]
    TimeoutOutOfRange(i64),

    #[error("invalid worker count - worker count could not be read as int")]
    WorkersNotInteger(String),

    #[error("invalid worker count - please specify a worker count between 1 and 9")]
    WorkersOutOfRange(i64),
}

/// Errors raised while stitching the two discovery caches into a path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Title '{title}' is missing from the discovery cache")]
    Missing { title: String },

    #[error("Parent chain loops back on '{title}'")]
    Cycle { title: String },
}

/// Result type alias for Wikirace operations
pub type Result<T> = std::result::Result<T, WikiraceError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for link provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

// Re-export commonly used types
pub use config::Config;
pub use provider::{LinkBatch, LinkProvider, LinkSession, WikipediaProvider};
pub use race::{run_race, Coordinator, RaceOutcome, RaceReport};
pub use state::{BackwardLedger, CrawlerState, DiscoveryCache, Edge, LedgerEntry};
