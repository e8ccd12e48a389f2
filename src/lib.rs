//! Sumi-Check: a pre-deployment verifier for web pages
//!
//! This crate fetches a declared list of pages and checks them, together with
//! every resource they reference, for reachability, redirect and security
//! policy, content-hash integrity, XHTML well-formedness, response latency and
//! cache/compression header hygiene.
//!
//! # Example
//!
//! ```no_run
//! use sumi_check::config::Config;
//! use sumi_check::checker::verify;
//!
//! # async fn example() -> Result<(), sumi_check::CheckError> {
//! let mut config = Config::with_pages(vec!["https://example.com/".to_string()]);
//! config.checks.links = true;
//!
//! let report = verify(config).await?;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod checker;
pub mod config;
pub mod integrity;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Run-fatal errors
///
/// Everything that goes wrong while checking an individual page or link is
/// recorded as an [`output::Issue`] instead; only these abort a run.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),
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

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Cannot resolve local path: {0}")]
    LocalPath(String),
}

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use checker::{verify, verify_with_sink, VerifyReport};
pub use config::Config;
pub use output::{Issue, MemorySink, ReportSink, TracingSink};
pub use state::LinkState;
pub use crate::url::{dedup_key, is_local_host, normalize_page, resolve_link};
