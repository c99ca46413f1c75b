//! Site Mapper: a bounded crawler that separates valuable links from crawler traps
//!
//! This crate crawls a single site breadth-first, records every outbound link
//! found on each page together with structural metadata produced by pluggable
//! analyzers, and turns the resulting link graph into a feature table with
//! rule-based "good link" / "crawler trap" labels.

pub mod analysis;
pub mod config;
pub mod crawler;
pub mod features;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site Mapper operations
#[derive(Debug, Error)]
pub enum SiteMapperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Seed URL must be http or https: {0}")]
    InvalidSeed(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// All of these are fatal at startup, before any crawl state exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid host pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid log level: {0} (expected DEBUG, INFO, WARNING or ERROR)")]
    InvalidLogLevel(String),
}

/// Page-scoped crawl failure
///
/// Raised by the page crawl executor and always handled by the frontier
/// manager: the page stays visited but gets no link graph entry.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Failed to load {url} after {attempts} attempt(s): {reason}")]
    Navigation {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Outlink extraction failed for {url}: {reason}")]
    Extraction { url: String, reason: String },
}

impl NetworkError {
    /// The URL of the page that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Navigation { url, .. } | Self::Extraction { url, .. } => url,
        }
    }
}

/// Result type alias for Site Mapper operations
pub type Result<T> = std::result::Result<T, SiteMapperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::state::{LinkGraph, OutlinkRecord};
pub use crate::url::is_in_scope;
