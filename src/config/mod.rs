//! Configuration module for Wikirace
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing values fall back to the defaults used
//! against the English Wikipedia API.
//!
//! # Example
//!
//! ```no_run
//! use wikirace::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wikirace.toml")).unwrap();
//! println!("Forward workers: {}", config.race.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, Config, RaceConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, MAX_TIMEOUT_SECS, MAX_TITLES_PER_QUERY, MAX_WORKERS};
