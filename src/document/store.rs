//! Deduplicating document registry
//!
//! The store is the single source of truth for "has this identity been
//! fetched or is it being fetched". Workers reserve an identity before
//! fetching it; discoveries that race an in-flight fetch are parked as
//! pending references and attached when the fetch completes. This is what
//! keeps the fetch count per identity at most one.

use super::{DiscoveredUrl, Document, DocumentRef, IdentityKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;
use uuid::Uuid;

/// Outcome of asking the store to begin fetching an identity
#[derive(Debug)]
pub enum BeginFetch {
    /// The identity was unknown; the caller now owns fetching it
    Started,
    /// Another worker is already fetching it; any reference was parked
    /// and will attach when that fetch completes
    Deferred,
    /// The identity is already complete; the new inbound reference (if
    /// the discovery carried a source) was attached to it
    Existing {
        document: Arc<Document>,
        reference: Option<DocumentRef>,
    },
}

/// A reference discovered while its target was still being fetched
#[derive(Debug, Clone)]
struct PendingRef {
    source_id: Uuid,
    source_url: Url,
    excerpt: Option<String>,
}

enum StoreEntry {
    Pending(Vec<PendingRef>),
    Complete(Arc<Document>),
}

#[derive(Default)]
struct StoreState {
    entries: HashMap<IdentityKey, StoreEntry>,
    /// Completed documents in completion order
    completed: Vec<Arc<Document>>,
}

/// The append-only, deduplicated registry of documents
#[derive(Default)]
pub struct DocumentStore {
    state: Mutex<StoreState>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves or resolves the identity of a discovered URL
    ///
    /// The existence check and the reservation happen under one lock, so
    /// two workers racing on the same identity cannot both fetch it.
    ///
    /// Redirect-follow discoveries never record a reference: the redirect
    /// edge is already recorded on the redirecting document via
    /// `redirect_url`.
    pub fn begin(&self, discovered: &DiscoveredUrl) -> BeginFetch {
        let key = discovered.identity();
        let mut state = self.state.lock().unwrap();

        match state.entries.get_mut(&key) {
            Some(StoreEntry::Complete(document)) => {
                let document = Arc::clone(document);
                drop(state);
                let reference = match &discovered.source {
                    Some(source) if !discovered.is_redirect => {
                        let reference = DocumentRef {
                            source_id: Some(source.id),
                            source_url: Some(source.url.clone()),
                            target_id: document.id,
                            target_url: document.url.clone(),
                            excerpt: discovered.excerpt.clone(),
                        };
                        document.add_reference(reference.clone());
                        Some(reference)
                    }
                    _ => None,
                };
                BeginFetch::Existing {
                    document,
                    reference,
                }
            }
            Some(StoreEntry::Pending(pending)) => {
                if let Some(source) = &discovered.source {
                    if !discovered.is_redirect {
                        pending.push(PendingRef {
                            source_id: source.id,
                            source_url: source.url.clone(),
                            excerpt: discovered.excerpt.clone(),
                        });
                    }
                }
                BeginFetch::Deferred
            }
            None => {
                state.entries.insert(key, StoreEntry::Pending(Vec::new()));
                BeginFetch::Started
            }
        }
    }

    /// Completes a reserved fetch, attaching any references parked while
    /// the fetch was in flight
    ///
    /// Returns the stored document and the newly attached references so
    /// the engine can notify observers about them.
    pub fn complete(&self, document: Document) -> (Arc<Document>, Vec<DocumentRef>) {
        let key = document.identity();
        let document = Arc::new(document);

        let pending = {
            let mut state = self.state.lock().unwrap();
            let pending = match state
                .entries
                .insert(key, StoreEntry::Complete(Arc::clone(&document)))
            {
                Some(StoreEntry::Pending(pending)) => pending,
                _ => Vec::new(),
            };
            state.completed.push(Arc::clone(&document));
            pending
        };

        let attached: Vec<DocumentRef> = pending
            .into_iter()
            .map(|parked| {
                let reference = DocumentRef {
                    source_id: Some(parked.source_id),
                    source_url: Some(parked.source_url),
                    target_id: document.id,
                    target_url: document.url.clone(),
                    excerpt: parked.excerpt,
                };
                document.add_reference(reference.clone());
                reference
            })
            .collect();

        (document, attached)
    }

    /// Snapshot of all completed documents, in completion order
    pub fn documents(&self) -> Vec<Arc<Document>> {
        self.state.lock().unwrap().completed.clone()
    }

    /// Number of completed documents
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn seed(s: &str) -> DiscoveredUrl {
        DiscoveredUrl::seed(url(s))
    }

    #[test]
    fn test_first_begin_starts() {
        let store = DocumentStore::new();
        assert!(matches!(store.begin(&seed("http://a.test/")), BeginFetch::Started));
    }

    #[test]
    fn test_second_begin_defers_while_pending() {
        let store = DocumentStore::new();
        assert!(matches!(store.begin(&seed("http://a.test/")), BeginFetch::Started));
        assert!(matches!(store.begin(&seed("http://a.test/")), BeginFetch::Deferred));
    }

    #[test]
    fn test_begin_after_complete_returns_existing() {
        let store = DocumentStore::new();
        store.begin(&seed("http://a.test/"));
        store.complete(Document::new(url("http://a.test/"), None));

        match store.begin(&seed("http://a.test/")) {
            BeginFetch::Existing { reference, .. } => assert!(reference.is_none()),
            other => panic!("expected existing, got {:?}", other),
        }
    }

    #[test]
    fn test_existing_with_source_attaches_reference() {
        let store = DocumentStore::new();
        store.begin(&seed("http://a.test/"));
        let (target, _) = store.complete(Document::new(url("http://a.test/"), None));

        let source = Arc::new(Document::new(url("http://a.test/b"), None));
        let discovery = DiscoveredUrl {
            url: url("http://a.test/"),
            language: None,
            source: Some(Arc::clone(&source)),
            excerpt: Some("<a href=\"/\">".to_string()),
            is_redirect: false,
        };

        match store.begin(&discovery) {
            BeginFetch::Existing {
                document,
                reference,
            } => {
                let reference = reference.unwrap();
                assert_eq!(reference.source_id, Some(source.id));
                assert_eq!(reference.target_id, target.id);
                assert_eq!(document.references().len(), 1);
            }
            other => panic!("expected existing, got {:?}", other),
        }
    }

    #[test]
    fn test_deferred_reference_attaches_on_complete() {
        let store = DocumentStore::new();
        store.begin(&seed("http://a.test/"));

        let source = Arc::new(Document::new(url("http://a.test/b"), None));
        let racing = DiscoveredUrl {
            url: url("http://a.test/"),
            language: None,
            source: Some(Arc::clone(&source)),
            excerpt: None,
            is_redirect: false,
        };
        assert!(matches!(store.begin(&racing), BeginFetch::Deferred));

        let (document, attached) = store.complete(Document::new(url("http://a.test/"), None));
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].source_id, Some(source.id));
        assert_eq!(document.references().len(), 1);
    }

    #[test]
    fn test_deferred_redirect_follow_attaches_no_reference() {
        let store = DocumentStore::new();
        store.begin(&seed("http://a.test/"));

        let source = Arc::new(Document::new(url("http://a.test/old"), None));
        let follow = DiscoveredUrl {
            url: url("http://a.test/"),
            language: None,
            source: Some(source),
            excerpt: None,
            is_redirect: true,
        };
        assert!(matches!(store.begin(&follow), BeginFetch::Deferred));

        let (document, attached) = store.complete(Document::new(url("http://a.test/"), None));
        assert!(attached.is_empty());
        assert!(document.references().is_empty());
    }

    #[test]
    fn test_existing_redirect_follow_attaches_no_reference() {
        let store = DocumentStore::new();
        store.begin(&seed("http://a.test/"));
        store.complete(Document::new(url("http://a.test/"), None));

        let source = Arc::new(Document::new(url("http://a.test/old"), None));
        let follow = DiscoveredUrl {
            url: url("http://a.test/"),
            language: None,
            source: Some(source),
            excerpt: None,
            is_redirect: true,
        };

        match store.begin(&follow) {
            BeginFetch::Existing {
                document,
                reference,
            } => {
                assert!(reference.is_none());
                assert!(document.references().is_empty());
            }
            other => panic!("expected existing, got {:?}", other),
        }
    }

    #[test]
    fn test_language_creates_distinct_identity() {
        let store = DocumentStore::new();
        store.begin(&seed("http://a.test/"));

        let localized = DiscoveredUrl {
            url: url("http://a.test/"),
            language: Some("fr".to_string()),
            source: None,
            excerpt: None,
            is_redirect: false,
        };
        assert!(matches!(store.begin(&localized), BeginFetch::Started));
    }

    #[test]
    fn test_documents_in_completion_order() {
        let store = DocumentStore::new();
        store.begin(&seed("http://a.test/1"));
        store.begin(&seed("http://a.test/2"));
        store.complete(Document::new(url("http://a.test/2"), None));
        store.complete(Document::new(url("http://a.test/1"), None));

        let docs = store.documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].url.as_str(), "http://a.test/2");
        assert_eq!(docs[1].url.as_str(), "http://a.test/1");
    }
}
