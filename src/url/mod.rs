//! URL handling module for SiteScope
//!
//! This module provides the pure URL helpers the crawler is built on:
//! host comparison, MIME-type classification, redirect-status checks,
//! protocol filtering, and the `srcset`/CSS-`url()` micro-parsers.

mod classify;
mod extract;

// Re-export main functions
pub use classify::{
    is_css_mime_type, is_html_mime_type, is_http_protocol, is_javascript_mime_type,
    is_redirect_status, is_same_host, strip_fragment,
};
pub use extract::{parse_css_url, parse_srcset};

use url::Url;

/// Resolves a possibly-relative reference against a base URL
///
/// Returns `None` when the reference cannot be parsed against the base.
/// The resolved URL keeps its fragment; callers strip it at enqueue time.
pub fn resolve(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    base.join(reference).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() {
        let base = Url::parse("https://example.com/a/b").unwrap();
        assert_eq!(
            resolve(&base, "/c").unwrap().as_str(),
            "https://example.com/c"
        );
        assert_eq!(
            resolve(&base, "c").unwrap().as_str(),
            "https://example.com/a/c"
        );
    }

    #[test]
    fn test_resolve_absolute() {
        let base = Url::parse("https://example.com/").unwrap();
        assert_eq!(
            resolve(&base, "https://other.com/x").unwrap().as_str(),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_resolve_empty() {
        let base = Url::parse("https://example.com/").unwrap();
        assert!(resolve(&base, "").is_none());
        assert!(resolve(&base, "   ").is_none());
    }
}
