//! The crawl engine
//!
//! This module contains the concurrent machinery of a crawl:
//! - the retrying HTTP transport and the document fetcher
//! - the URL frontier with quiescence-based termination
//! - the scope policy deciding which discoveries get fetched
//! - HTML/CSS processing and link extraction
//! - the orchestrating engine and its worker pool

mod engine;
mod fetcher;
mod frontier;
mod parser;
mod scope;
mod transport;

pub use engine::{Crawler, CrawlerOptions};
pub use fetcher::{FetchedContent, Fetcher};
pub use frontier::Frontier;
pub use parser::{process_html, process_stylesheet, ExtractedLink, PageOutcome, StylesheetOutcome};
pub use scope::ScopePolicy;
pub use transport::{build_http_client, RetryPolicy, RetryingTransport};
