//! Configuration module for SiteScope
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and turning them into [`CrawlerOptions`].
//!
//! # Example
//!
//! ```no_run
//! use sitescope::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! let options = config.to_options().unwrap();
//! println!("Worker pool size: {}", options.max_concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig};

// Re-export parser functions
pub use parser::load_config;

pub use validation::{compile_includes, validate};

use crate::crawler::CrawlerOptions;
use crate::ConfigResult;

impl Config {
    /// Builds crawler options from this configuration, filling unset
    /// fields with the built-in defaults
    pub fn to_options(&self) -> ConfigResult<CrawlerOptions> {
        let defaults = CrawlerOptions::default();
        Ok(CrawlerOptions {
            user_agent: self
                .crawler
                .user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
            default_accept_language: self.crawler.default_accept_language.clone(),
            max_concurrency: self.crawler.max_concurrency,
            includes: compile_includes(&self.crawler.includes)?,
            retry: defaults.retry,
        })
    }
}
