//! Configuration module for Sumi-Check
//!
//! This module handles loading, parsing, and validating TOML run configurations.
//!
//! # Example
//!
//! ```no_run
//! use sumi_check::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("check.toml")).unwrap();
//! println!("Checking {} pages", config.pages.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_user_agent, ChecksConfig, Config, HttpConfig, LinkPolicyConfig, ReportConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
