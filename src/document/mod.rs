//! Document graph data model
//!
//! A crawl produces a graph of [`Document`]s connected by [`DocumentRef`]
//! edges. Documents are deduplicated by identity key: the fragment-stripped
//! URL plus the optional language tag a `hreflang` discovery carried. Later
//! discoveries of an already-known identity add inbound references instead
//! of refetching.

pub mod store;

pub use store::{BeginFetch, DocumentStore};

use crate::analysers::AnalyserResultItem;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use url::Url;
use uuid::Uuid;

/// The deduplication key: two documents are the same iff URL and language
/// match exactly
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub url: Url,
    pub language: Option<String>,
}

impl IdentityKey {
    pub fn new(url: Url, language: Option<String>) -> Self {
        Self { url, language }
    }
}

/// A parse diagnostic recorded while processing an HTML response
///
/// Position fields are optional: they are filled only when the parsing
/// engine reports where the error occurred.
#[derive(Debug, Clone)]
pub struct HtmlError {
    pub message: String,
    pub excerpt: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// 1-based position of the offending character within the excerpt
    pub position: Option<u32>,
}

impl HtmlError {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            excerpt: None,
            line: None,
            column: None,
            position: None,
        }
    }
}

/// A directed reference edge between two documents
///
/// Holds ids and URLs rather than document pointers so that mutually
/// referential pages do not form ownership cycles. Seeds have no source.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub source_id: Option<Uuid>,
    pub source_url: Option<Url>,
    pub target_id: Uuid,
    pub target_url: Url,
    /// The HTML/CSS snippet that produced the link
    pub excerpt: Option<String>,
}

/// The record of one fetch attempt (success or failure) at an identity
///
/// All fields except `referenced_by` are written only by the worker that
/// created the document, then frozen by insertion into the store.
/// `referenced_by` keeps accumulating as other workers rediscover the
/// same identity.
#[derive(Debug)]
pub struct Document {
    pub id: Uuid,
    pub url: Url,
    pub language: Option<String>,
    pub status: Option<u16>,
    pub reason_phrase: Option<String>,
    pub request_headers: BTreeMap<String, String>,
    pub response_headers: BTreeMap<String, String>,
    pub redirect_url: Option<Url>,
    pub redirection_loop: bool,
    pub title: Option<String>,
    pub error_message: Option<String>,
    pub full_error_message: Option<String>,
    pub html_errors: Vec<HtmlError>,
    pub analyser_results: Vec<AnalyserResultItem>,
    pub crawled_on: DateTime<Utc>,
    /// The redirecting document this one was discovered from, if any.
    /// Forms a single-parent chain used for redirect-loop detection.
    pub redirect_parent: Option<Arc<Document>>,
    referenced_by: Mutex<Vec<DocumentRef>>,
}

impl Document {
    pub fn new(url: Url, language: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            language,
            status: None,
            reason_phrase: None,
            request_headers: BTreeMap::new(),
            response_headers: BTreeMap::new(),
            redirect_url: None,
            redirection_loop: false,
            title: None,
            error_message: None,
            full_error_message: None,
            html_errors: Vec::new(),
            analyser_results: Vec::new(),
            crawled_on: Utc::now(),
            redirect_parent: None,
            referenced_by: Mutex::new(Vec::new()),
        }
    }

    /// The deduplication key for this document
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(self.url.clone(), self.language.clone())
    }

    /// True if the response was a followed redirect
    pub fn is_redirection(&self) -> bool {
        self.redirect_url.is_some()
    }

    /// Appends an inbound reference. Safe to call from multiple workers.
    pub fn add_reference(&self, reference: DocumentRef) {
        self.referenced_by.lock().unwrap().push(reference);
    }

    /// Snapshot of the inbound references accumulated so far
    pub fn references(&self) -> Vec<DocumentRef> {
        self.referenced_by.lock().unwrap().clone()
    }

    /// Walks the redirect ancestry (this document included) looking for
    /// the given identity
    ///
    /// The chain is acyclic by construction, loops are never extended,
    /// so the walk always terminates.
    pub fn has_redirect_ancestor(&self, key: &IdentityKey) -> bool {
        if self.identity() == *key {
            return true;
        }
        let mut current = self.redirect_parent.as_ref();
        while let Some(parent) = current {
            if parent.identity() == *key {
                return true;
            }
            current = parent.redirect_parent.as_ref();
        }
        false
    }
}

/// A pending unit of crawl work
///
/// Created by extraction or redirect handling, consumed exactly once by a
/// worker, never mutated after creation.
#[derive(Debug, Clone)]
pub struct DiscoveredUrl {
    pub url: Url,
    pub language: Option<String>,
    /// The document whose content produced this URL; `None` for seeds
    pub source: Option<Arc<Document>>,
    pub excerpt: Option<String>,
    /// True when this entry means "follow this document's redirect",
    /// which bypasses scope filtering
    pub is_redirect: bool,
}

impl DiscoveredUrl {
    /// A seed entry with no source document
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            language: None,
            source: None,
            excerpt: None,
            is_redirect: false,
        }
    }

    /// The identity this entry would fetch under
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(self.url.clone(), self.language.clone())
    }
}

/// The aggregate handed back to the caller when a run completes
#[derive(Debug)]
pub struct CrawlResult {
    /// The resolved seed set
    pub root_urls: Vec<Url>,
    /// Every document fetched or attempted during the run
    pub documents: Vec<Arc<Document>>,
}
