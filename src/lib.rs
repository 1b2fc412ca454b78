//! Sumi-Formfill: crawler-side HTTP client and form-fill inference
//!
//! This crate provides the two decision-making pieces a crawler needs while it
//! fetches pages and exercises HTML forms: a retrying HTTP client that follows
//! redirects itself so it can report crawl depth, and a deterministic engine
//! that suggests submission values for a form's fields.

pub mod client;
pub mod config;
pub mod forms;

use thiserror::Error;

/// Main error type for Sumi-Formfill operations
#[derive(Debug, Error)]
pub enum FormfillError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] ClientError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
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
}

/// Errors raised while building or driving the crawl client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("stopped after 10 redirects (last hop: {url})")]
    TooManyRedirects { url: String },

    #[error("Invalid redirect location from {url}: {location}")]
    InvalidRedirect { url: String, location: String },
}

/// Result type alias for Sumi-Formfill operations
pub type Result<T> = std::result::Result<T, FormfillError>;

// Re-export commonly used types
pub use client::{build_client, ClientOptions, CrawlClient, CrawlRequest, SystemDialer};
pub use config::Config;
pub use forms::{fill_suggestions, FieldDescriptor, FieldKind, FillProfile, SuggestionMap};
