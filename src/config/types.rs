use serde::Deserialize;

/// Main configuration structure for SiteScope
///
/// Every field has a sensible default so an empty file (or no file at all)
/// yields a working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlerConfig {
    /// User agent string sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,

    /// `Accept-Language` sent when a discovery carries no language of its
    /// own
    #[serde(rename = "default-accept-language")]
    pub default_accept_language: Option<String>,

    /// Size of the worker pool
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Regex patterns admitting URLs outside the root hosts
    #[serde(default)]
    pub includes: Vec<String>,
}

fn default_max_concurrency() -> usize {
    16
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            default_accept_language: None,
            max_concurrency: default_max_concurrency(),
            includes: Vec::new(),
        }
    }
}
