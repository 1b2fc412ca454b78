//! Configuration module for Sumi-Formfill
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing keys fall back to built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use sumi_formfill::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("formfill.toml")).unwrap();
//! println!("Client will retry {} times", config.client.retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FormFillConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
