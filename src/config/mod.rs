//! Configuration module for Sitegrab
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; a missing file section falls back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use sitegrab::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitegrab.toml")).unwrap();
//! println!("Polite delay: {:?}", config.crawler.request_delay());
//! ```

mod parser;
mod seeds;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ConfigOverrides, CrawlerConfig, OutputConfig, RendererKind, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, read_config_with_hash,
};
pub use seeds::{load_seed_list, merge_seeds};
pub use validation::validate;
