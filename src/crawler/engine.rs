//! Crawl orchestration
//!
//! The engine owns a run: it parses the seed list, builds the shared
//! frontier/store/fetcher state, spawns the worker pool, and hands back the
//! finished document graph. Workers drain the frontier until it detects
//! quiescence (nothing queued, nothing in flight) or the run is cancelled.

use super::fetcher::{FetchedContent, Fetcher};
use super::frontier::Frontier;
use super::parser;
use super::scope::ScopePolicy;
use super::transport::{build_http_client, RetryPolicy, RetryingTransport};
use crate::analysers::AnalyserSet;
use crate::document::{
    BeginFetch, CrawlResult, DiscoveredUrl, Document, DocumentRef, DocumentStore, IdentityKey,
};
use crate::events::{CrawlObserver, EventDispatcher};
use crate::url::{is_http_protocol, strip_fragment};
use crate::{CrawlError, Result};
use regex::Regex;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Tunable knobs for a crawl run
#[derive(Debug, Clone)]
pub struct CrawlerOptions {
    pub user_agent: String,
    /// Sent as `Accept-Language` when a discovery carries no language
    pub default_accept_language: Option<String>,
    /// Size of the worker pool
    pub max_concurrency: usize,
    /// Patterns admitting URLs that host scoping alone would drop
    pub includes: Vec<Regex>,
    pub retry: RetryPolicy,
}

impl Default for CrawlerOptions {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; SiteScope/1.0)".to_string(),
            default_accept_language: None,
            max_concurrency: 16,
            includes: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }
}

/// The crawl engine
///
/// # Examples
///
/// ```no_run
/// use sitescope::{Crawler, CrawlerOptions};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> sitescope::Result<()> {
/// let crawler = Crawler::new(CrawlerOptions::default());
/// let result = crawler.run("example.com", CancellationToken::new()).await?;
/// println!("{} documents", result.documents.len());
/// # Ok(())
/// # }
/// ```
pub struct Crawler {
    options: CrawlerOptions,
    analysers: AnalyserSet,
    observers: Vec<Box<dyn CrawlObserver>>,
}

impl Crawler {
    /// A crawler with the built-in analyser set and no observers
    pub fn new(options: CrawlerOptions) -> Self {
        Self {
            options,
            analysers: AnalyserSet::with_defaults(),
            observers: Vec::new(),
        }
    }

    /// Replaces the analyser set
    pub fn with_analysers(mut self, analysers: AnalyserSet) -> Self {
        self.analysers = analysers;
        self
    }

    /// Adds a lifecycle observer
    pub fn with_observer(mut self, observer: Box<dyn CrawlObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Runs a crawl from a comma-separated seed list
    ///
    /// Seeds without a scheme get `http://` prefixed. The run ends when the
    /// frontier goes quiescent, or with [`CrawlError::Cancelled`] when the
    /// token fires first.
    pub async fn run(self, root_urls: &str, cancel: CancellationToken) -> Result<CrawlResult> {
        let seeds = parse_seeds(root_urls)?;
        tracing::info!(
            "Starting crawl of {} with {} workers",
            seeds
                .iter()
                .map(Url::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            self.options.max_concurrency
        );

        let client = build_http_client(&self.options.user_agent)?;
        let transport = RetryingTransport::new(client, self.options.retry.clone());
        let shared = Arc::new(Shared {
            frontier: Frontier::new(),
            store: DocumentStore::new(),
            scope: ScopePolicy::new(seeds.clone(), self.options.includes.clone()),
            fetcher: Fetcher::new(
                transport,
                self.options.user_agent.clone(),
                self.options.default_accept_language.clone(),
            ),
            analysers: self.analysers,
            events: EventDispatcher::new(self.observers),
        });

        for seed in &seeds {
            shared.frontier.enqueue(DiscoveredUrl::seed(seed.clone()));
        }

        let mut workers = JoinSet::new();
        for _ in 0..self.options.max_concurrency.max(1) {
            let shared = Arc::clone(&shared);
            let cancel = cancel.clone();
            workers.spawn(worker(shared, cancel));
        }
        while let Some(joined) = workers.join_next().await {
            joined?;
        }

        if cancel.is_cancelled() {
            tracing::warn!("Crawl cancelled after {} documents", shared.store.len());
            return Err(CrawlError::Cancelled);
        }

        tracing::info!("Crawl finished: {} documents", shared.store.len());
        Ok(CrawlResult {
            root_urls: seeds,
            documents: shared.store.documents(),
        })
    }
}

struct Shared {
    frontier: Frontier,
    store: DocumentStore,
    scope: ScopePolicy,
    fetcher: Fetcher,
    analysers: AnalyserSet,
    events: EventDispatcher,
}

fn parse_seeds(root_urls: &str) -> Result<Vec<Url>> {
    let mut seeds = Vec::new();
    for part in root_urls.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let candidate = if part.contains("://") {
            part.to_string()
        } else {
            format!("http://{part}")
        };
        let url = Url::parse(&candidate).map_err(|error| CrawlError::InvalidSeed {
            url: part.to_string(),
            message: error.to_string(),
        })?;
        if !is_http_protocol(&url) {
            return Err(CrawlError::InvalidSeed {
                url: part.to_string(),
                message: "only http and https URLs can be crawled".to_string(),
            });
        }
        seeds.push(strip_fragment(&url));
    }
    if seeds.is_empty() {
        return Err(CrawlError::NoSeeds);
    }
    Ok(seeds)
}

async fn worker(shared: Arc<Shared>, cancel: CancellationToken) {
    loop {
        let discovered = tokio::select! {
            _ = cancel.cancelled() => {
                shared.frontier.close();
                return;
            }
            next = shared.frontier.next() => match next {
                Some(discovered) => discovered,
                None => return,
            },
        };

        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = process(&shared, discovered) => {}
        }
        shared.frontier.complete();
    }
}

/// Handles one frontier item end to end: scope check, dedup, fetch,
/// parse, analyse, store, enqueue discoveries
async fn process(shared: &Shared, discovered: DiscoveredUrl) {
    if !shared.scope.must_process(&discovered) {
        tracing::debug!("Out of scope, skipping {}", discovered.url);
        return;
    }

    match shared.store.begin(&discovered) {
        BeginFetch::Started => {}
        BeginFetch::Deferred => return,
        BeginFetch::Existing {
            document,
            reference,
        } => {
            if let Some(reference) = reference {
                shared.events.document_ref_added(&document, &reference);
                shared.events.document_updated(&document);
            }
            return;
        }
    }

    let mut document = Document::new(discovered.url.clone(), discovered.language.clone());
    if discovered.is_redirect {
        document.redirect_parent = discovered.source.clone();
    }

    tracing::debug!("Fetching {}", document.url);
    let content = shared.fetcher.fetch(&mut document).await;

    let mut links = Vec::new();
    match content {
        FetchedContent::Html(body) => {
            let outcome = parser::process_html(&document, &body, &shared.analysers);
            document.title = outcome.title;
            document.html_errors = outcome.html_errors;
            if let Some(target) = outcome.redirect_url {
                // meta refresh counts as a redirect
                document.redirect_url = Some(target);
            }
            document.analyser_results.extend(outcome.analyser_items);
            links = outcome.links;
        }
        FetchedContent::Stylesheet(body) => {
            let outcome = parser::process_stylesheet(&document, &body, &shared.analysers);
            document.analyser_results.extend(outcome.analyser_items);
            links = outcome.links;
        }
        FetchedContent::Redirect | FetchedContent::Other | FetchedContent::Failed => {}
    }

    document
        .analyser_results
        .extend(shared.analysers.run_document(&document));

    let redirect_follow = match document.redirect_url.clone() {
        Some(target) => {
            let target = strip_fragment(&target);
            let key = IdentityKey::new(target.clone(), None);
            if document.has_redirect_ancestor(&key) {
                tracing::debug!("Redirection loop at {} -> {}", document.url, target);
                document.redirection_loop = true;
                None
            } else {
                Some(target)
            }
        }
        None => None,
    };

    let (document, deferred) = shared.store.complete(document);

    if !discovered.is_redirect {
        if let Some(source) = &discovered.source {
            let reference = DocumentRef {
                source_id: Some(source.id),
                source_url: Some(source.url.clone()),
                target_id: document.id,
                target_url: document.url.clone(),
                excerpt: discovered.excerpt.clone(),
            };
            document.add_reference(reference.clone());
            shared.events.document_ref_added(&document, &reference);
        }
    }

    shared.events.document_parsed(&document);
    for reference in &deferred {
        shared.events.document_ref_added(&document, reference);
    }

    for link in links {
        enqueue(
            shared,
            DiscoveredUrl {
                url: link.url,
                language: link.language,
                source: Some(Arc::clone(&document)),
                excerpt: link.excerpt,
                is_redirect: false,
            },
        );
    }

    if let Some(target) = redirect_follow {
        enqueue(
            shared,
            DiscoveredUrl {
                url: target,
                language: None,
                source: Some(Arc::clone(&document)),
                excerpt: None,
                is_redirect: true,
            },
        );
    }
}

/// Admits a discovery into the frontier: non-http(s) schemes are dropped
/// and fragments are stripped so identity never sees them
fn enqueue(shared: &Shared, mut discovered: DiscoveredUrl) {
    if !is_http_protocol(&discovered.url) {
        return;
    }
    discovered.url = strip_fragment(&discovered.url);
    shared.frontier.enqueue(discovered);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seeds_adds_scheme() {
        let seeds = parse_seeds("example.com").unwrap();
        assert_eq!(seeds[0].as_str(), "http://example.com/");
    }

    #[test]
    fn test_parse_seeds_csv() {
        let seeds = parse_seeds("http://a.test/, b.test ,").unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[1].as_str(), "http://b.test/");
    }

    #[test]
    fn test_parse_seeds_strips_fragment() {
        let seeds = parse_seeds("http://a.test/page#section").unwrap();
        assert_eq!(seeds[0].as_str(), "http://a.test/page");
    }

    #[test]
    fn test_parse_seeds_rejects_non_http() {
        assert!(matches!(
            parse_seeds("ftp://a.test/"),
            Err(CrawlError::InvalidSeed { .. })
        ));
    }

    #[test]
    fn test_parse_seeds_empty_input() {
        assert!(matches!(parse_seeds(" , "), Err(CrawlError::NoSeeds)));
    }

    #[test]
    fn test_default_options() {
        let options = CrawlerOptions::default();
        assert_eq!(options.max_concurrency, 16);
        assert!(options.includes.is_empty());
    }
}
