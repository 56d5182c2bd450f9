//! Crawl lifecycle notifications
//!
//! Observers receive callbacks as documents move through the crawl: when a
//! document finishes fetching and parsing, when an already-stored document
//! changes (a reference lands on it after completion), and when a
//! reference is attached to a document. Callbacks run on worker tasks; the dispatcher
//! serializes them so observer implementations never see two callbacks at
//! once.

use crate::document::{Document, DocumentRef};
use std::sync::{Arc, Mutex};

/// Receives crawl lifecycle events
///
/// All methods default to no-ops so implementations only override what
/// they care about.
pub trait CrawlObserver: Send + Sync {
    /// A document was fetched, parsed, and stored
    fn document_parsed(&self, document: &Arc<Document>) {
        let _ = document;
    }

    /// A stored document changed after completion
    fn document_updated(&self, document: &Arc<Document>) {
        let _ = document;
    }

    /// A reference was attached to a document
    fn document_ref_added(&self, document: &Arc<Document>, reference: &DocumentRef) {
        let _ = (document, reference);
    }
}

/// Fans events out to a list of observers, one callback at a time
pub struct EventDispatcher {
    observers: Vec<Box<dyn CrawlObserver>>,
    gate: Mutex<()>,
}

impl EventDispatcher {
    pub fn new(observers: Vec<Box<dyn CrawlObserver>>) -> Self {
        Self {
            observers,
            gate: Mutex::new(()),
        }
    }

    pub fn document_parsed(&self, document: &Arc<Document>) {
        let _guard = self.gate.lock().unwrap();
        for observer in &self.observers {
            observer.document_parsed(document);
        }
    }

    pub fn document_updated(&self, document: &Arc<Document>) {
        let _guard = self.gate.lock().unwrap();
        for observer in &self.observers {
            observer.document_updated(document);
        }
    }

    pub fn document_ref_added(&self, document: &Arc<Document>, reference: &DocumentRef) {
        let _guard = self.gate.lock().unwrap();
        for observer in &self.observers {
            observer.document_ref_added(document, reference);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    struct Recording {
        seen: Mutex<Vec<String>>,
    }

    impl CrawlObserver for Recording {
        fn document_parsed(&self, document: &Arc<Document>) {
            self.seen
                .lock()
                .unwrap()
                .push(format!("parsed {}", document.url));
        }

        fn document_ref_added(&self, document: &Arc<Document>, reference: &DocumentRef) {
            self.seen.lock().unwrap().push(format!(
                "ref {} -> {}",
                reference
                    .source_url
                    .as_ref()
                    .map(|u| u.as_str())
                    .unwrap_or("-"),
                document.url
            ));
        }
    }

    #[test]
    fn test_events_reach_every_observer() {
        let first = Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
        });
        let second = Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
        });

        struct Forward(Arc<Recording>);
        impl CrawlObserver for Forward {
            fn document_parsed(&self, document: &Arc<Document>) {
                self.0.document_parsed(document);
            }
            fn document_ref_added(&self, document: &Arc<Document>, reference: &DocumentRef) {
                self.0.document_ref_added(document, reference);
            }
        }

        let dispatcher = EventDispatcher::new(vec![
            Box::new(Forward(Arc::clone(&first))),
            Box::new(Forward(Arc::clone(&second))),
        ]);

        let document = Arc::new(Document::new(Url::parse("http://a.test/").unwrap(), None));
        dispatcher.document_parsed(&document);

        assert_eq!(first.seen.lock().unwrap().len(), 1);
        assert_eq!(second.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_default_methods_are_no_ops() {
        struct Silent;
        impl CrawlObserver for Silent {}

        let dispatcher = EventDispatcher::new(vec![Box::new(Silent)]);
        let document = Arc::new(Document::new(Url::parse("http://a.test/").unwrap(), None));
        dispatcher.document_parsed(&document);
        dispatcher.document_updated(&document);
    }
}
