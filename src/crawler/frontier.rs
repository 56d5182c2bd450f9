//! Concurrent URL frontier with quiescence detection
//!
//! The frontier is the multi-producer multi-consumer queue feeding the
//! worker pool. It owns the termination protocol: the run is over exactly
//! when no worker is processing an item and the queue is empty.
//!
//! A single mutex guards the queue, the in-flight counter, and the closed
//! flag together. `next()` pops and increments under one lock acquisition;
//! `complete()` decrements and performs the close check under another. No
//! observer can ever see a worker between taking an item and being counted,
//! so the close decision cannot fire while discovered work is still being
//! pushed.

use crate::document::DiscoveredUrl;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

struct FrontierState {
    queue: VecDeque<DiscoveredUrl>,
    in_flight: usize,
    closed: bool,
}

/// The shared work queue for one crawl run
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FrontierState {
                queue: VecDeque::new(),
                in_flight: 0,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Pushes a discovered URL onto the queue
    ///
    /// Must be called before the discovering worker calls [`complete`],
    /// otherwise the close check could fire with this item unaccounted.
    ///
    /// [`complete`]: Frontier::complete
    pub fn enqueue(&self, item: DiscoveredUrl) {
        {
            let mut state = self.state.lock().unwrap();
            if state.closed {
                return;
            }
            state.queue.push_back(item);
        }
        self.notify.notify_waiters();
    }

    /// Takes the next item, waiting while the queue is empty but work is
    /// still in flight
    ///
    /// Returns `None` once the frontier has closed. A returned item counts
    /// as in flight until the caller passes it to [`complete`].
    ///
    /// [`complete`]: Frontier::complete
    pub async fn next(&self) -> Option<DiscoveredUrl> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().unwrap();
                if let Some(item) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Marks one taken item as fully processed
    ///
    /// Closes the frontier when this was the last in-flight item and the
    /// queue is empty, waking every parked worker so they can exit.
    pub fn complete(&self) {
        let close = {
            let mut state = self.state.lock().unwrap();
            state.in_flight -= 1;
            if state.in_flight == 0 && state.queue.is_empty() && !state.closed {
                state.closed = true;
                true
            } else {
                false
            }
        };
        if close {
            self.notify.notify_waiters();
        }
    }

    /// Closes the frontier immediately, discarding queued work
    ///
    /// Used on cancellation; parked workers wake up and drain out.
    pub fn close(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.closed = true;
            state.queue.clear();
        }
        self.notify.notify_waiters();
    }

    /// Number of queued items (diagnostics only)
    pub fn queued(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use url::Url;

    fn item(s: &str) -> DiscoveredUrl {
        DiscoveredUrl::seed(Url::parse(s).unwrap())
    }

    #[tokio::test]
    async fn test_enqueue_then_next() {
        let frontier = Frontier::new();
        frontier.enqueue(item("http://a.test/"));
        let taken = frontier.next().await.unwrap();
        assert_eq!(taken.url.as_str(), "http://a.test/");
    }

    #[tokio::test]
    async fn test_closes_when_last_item_completes() {
        let frontier = Frontier::new();
        frontier.enqueue(item("http://a.test/"));
        frontier.next().await.unwrap();
        frontier.complete();
        assert!(frontier.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stays_open_while_in_flight() {
        let frontier = Arc::new(Frontier::new());
        frontier.enqueue(item("http://a.test/1"));
        frontier.next().await.unwrap();

        // A second worker parks on the empty queue while the first is
        // still processing, then receives the item the first discovers.
        let parked = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.next().await })
        };

        frontier.enqueue(item("http://a.test/2"));
        frontier.complete();

        let taken = parked.await.unwrap();
        assert_eq!(taken.unwrap().url.as_str(), "http://a.test/2");
        frontier.complete();
        assert!(frontier.next().await.is_none());
    }

    #[tokio::test]
    async fn test_close_discards_queue_and_wakes_waiters() {
        let frontier = Arc::new(Frontier::new());
        let parked = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.next().await })
        };
        frontier.close();
        assert!(parked.await.unwrap().is_none());

        frontier.enqueue(item("http://a.test/"));
        assert_eq!(frontier.queued(), 0);
    }

    #[tokio::test]
    async fn test_fan_out_stress() {
        // Many workers, many small fan-outs: every item is taken exactly
        // once and the frontier closes only after the last completion.
        let frontier = Arc::new(Frontier::new());
        let taken = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        for i in 0..50 {
            frontier.enqueue(item(&format!("http://a.test/{i}")));
        }

        let mut workers = Vec::new();
        for _ in 0..8 {
            let frontier = Arc::clone(&frontier);
            let taken = Arc::clone(&taken);
            workers.push(tokio::spawn(async move {
                while let Some(discovered) = frontier.next().await {
                    let n = taken.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    // First 50 items each fan out into 4 more.
                    if n < 50 {
                        for j in 0..4 {
                            frontier
                                .enqueue(item(&format!("{}child/{j}", discovered.url)));
                        }
                    }
                    tokio::task::yield_now().await;
                    frontier.complete();
                }
            }));
        }

        for worker in workers {
            worker.await.unwrap();
        }
        assert_eq!(taken.load(std::sync::atomic::Ordering::SeqCst), 250);
    }
}
