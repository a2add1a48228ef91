//! Configuration module for hdb-flats
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing file is not an error for the CLI: `Config::default()` carries the
//! portal's known-good settings.
//!
//! # Example
//!
//! ```no_run
//! use hdb_flats::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("hdb-flats.toml")).unwrap();
//! println!("Unit retry delay: {}ms", config.retry.unit_delay);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, Config, OutputConfig, PortalConfig, RetryConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

// Re-export validation
pub use validation::validate;
