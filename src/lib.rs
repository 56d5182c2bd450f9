//! SiteScope: a concurrent website quality crawler
//!
//! This crate implements a web crawler that walks a site from a set of seed
//! URLs, discovers linked resources (pages, scripts, stylesheets, media,
//! CSS `url()` references), builds a deduplicated graph of documents and
//! cross-references, and runs pluggable quality/SEO/security analysers over
//! every fetched resource.

pub mod analysers;
pub mod config;
pub mod crawler;
pub mod css;
pub mod document;
pub mod events;
pub mod url;

use thiserror::Error;

/// Main error type for SiteScope operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL {url}: {message}")]
    InvalidSeed { url: String, message: String },

    #[error("No seed URLs given")]
    NoSeeds,

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid include pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Result type alias for SiteScope operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use analysers::{
    AnalyserResultItem, AnalyserSet, CssAnalyser, CssTarget, DocumentAnalyser, HtmlAnalyser,
    ResultType,
};
pub use config::Config;
pub use crawler::{Crawler, CrawlerOptions};
pub use document::{CrawlResult, DiscoveredUrl, Document, DocumentRef, HtmlError};
pub use events::CrawlObserver;
