//! Crawl scope policy
//!
//! Decides whether a discovered URL is eligible for fetching, before any
//! dedup check. Out-of-scope URLs are dropped silently; they produce no
//! document and no reference.

use crate::document::DiscoveredUrl;
use crate::url::is_same_host;
use regex::Regex;
use url::Url;

/// The rule set admitting discovered URLs into the crawl
///
/// In order:
/// 1. Seeds (no source document) are always processed.
/// 2. Redirect-follows are always processed, so loops and final statuses
///    get resolved.
/// 3. URLs on a root host are processed.
/// 4. URLs off the root hosts are processed once when discovered from a
///    root-host document (one hop into external sites, no recursion).
/// 5. URLs matching a configured include pattern are processed.
/// 6. Everything else is dropped.
pub struct ScopePolicy {
    root_urls: Vec<Url>,
    includes: Vec<Regex>,
}

impl ScopePolicy {
    pub fn new(root_urls: Vec<Url>, includes: Vec<Regex>) -> Self {
        Self {
            root_urls,
            includes,
        }
    }

    fn on_root_host(&self, url: &Url) -> bool {
        self.root_urls.iter().any(|root| is_same_host(root, url))
    }

    /// Returns true if the discovered URL should be fetched
    pub fn must_process(&self, discovered: &DiscoveredUrl) -> bool {
        let source = match &discovered.source {
            None => return true,
            Some(source) => source,
        };

        if discovered.is_redirect {
            return true;
        }

        let target_on_root = self.on_root_host(&discovered.url);
        if target_on_root {
            return true;
        }

        // One hop into an external site
        if self.on_root_host(&source.url) {
            return true;
        }

        self.includes
            .iter()
            .any(|include| include.is_match(discovered.url.as_str()))
    }
}
