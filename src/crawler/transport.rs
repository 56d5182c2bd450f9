//! Retrying HTTP transport
//!
//! This module wraps the HTTP client with a bounded, fixed-delay retry
//! policy for transient failures:
//! - HTTP 503 → wait and retry
//! - HTTP 429 → wait (shorter) and retry
//! - Network-level errors (connection, timeout, socket) → wait and retry
//! - Any other status is a terminal outcome returned to the caller
//!
//! Retries are per-request and independent across URLs. After exhausting
//! attempts the last response is returned (status-based retries) or the
//! last error is propagated (network errors).

use reqwest::{redirect::Policy, Client, Request, Response, StatusCode};
use std::time::Duration;

/// Retry policy knobs
///
/// Delays are fields rather than constants so tests can run with zero
/// delays instead of sleeping.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first
    pub max_attempts: u32,
    /// Delay after an HTTP 503 response
    pub service_unavailable_delay: Duration,
    /// Delay after an HTTP 429 response
    pub rate_limited_delay: Duration,
    /// Delay after a network-level error
    pub network_error_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            service_unavailable_delay: Duration::from_secs(5),
            rate_limited_delay: Duration::from_secs(1),
            network_error_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy with the default attempt count but no delays, for tests
    pub fn immediate() -> Self {
        Self {
            max_attempts: 3,
            service_unavailable_delay: Duration::ZERO,
            rate_limited_delay: Duration::ZERO,
            network_error_delay: Duration::ZERO,
        }
    }
}

/// HTTP transport with bounded retry for transient failures
#[derive(Debug, Clone)]
pub struct RetryingTransport {
    client: Client,
    policy: RetryPolicy,
}

/// Builds the HTTP client the crawler sends through
///
/// Redirects are disabled because the crawler follows them manually,
/// recording each hop as its own document.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

impl RetryingTransport {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// The underlying client, for building requests to send through this
    /// transport
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sends a request, retrying transient failures per the policy
    ///
    /// The request must be cloneable (GET requests without a streaming
    /// body always are); a non-cloneable request is sent exactly once.
    pub async fn send(&self, request: Request) -> Result<Response, reqwest::Error> {
        let mut attempt = 1;
        let mut current = request;

        loop {
            let is_last = attempt >= self.policy.max_attempts;
            let retry_copy = if is_last { None } else { current.try_clone() };
            let url = current.url().clone();

            match self.client.execute(current).await {
                Ok(response) => {
                    let delay = match response.status() {
                        StatusCode::SERVICE_UNAVAILABLE => self.policy.service_unavailable_delay,
                        StatusCode::TOO_MANY_REQUESTS => self.policy.rate_limited_delay,
                        _ => return Ok(response),
                    };

                    match retry_copy {
                        Some(next) => {
                            tracing::debug!(
                                "Retrying {} after status {} (attempt {}/{})",
                                url,
                                response.status(),
                                attempt,
                                self.policy.max_attempts
                            );
                            tokio::time::sleep(delay).await;
                            current = next;
                        }
                        None => return Ok(response),
                    }
                }
                Err(error) => {
                    if !is_network_error(&error) {
                        return Err(error);
                    }

                    match retry_copy {
                        Some(next) => {
                            tracing::debug!(
                                "Retrying {} after network error (attempt {}/{}): {}",
                                url,
                                attempt,
                                self.policy.max_attempts,
                                error
                            );
                            tokio::time::sleep(self.policy.network_error_delay).await;
                            current = next;
                        }
                        None => return Err(error),
                    }
                }
            }

            attempt += 1;
        }
    }
}

/// Returns true if the error is a network-level failure worth retrying
///
/// Connection and timeout errors are recognized directly; anything else
/// counts only if an `std::io::Error` appears in its cause chain (DNS
/// failures and socket resets surface that way).
fn is_network_error(error: &reqwest::Error) -> bool {
    if error.is_connect() || error.is_timeout() {
        return true;
    }
    has_io_error_in_chain(error)
}

fn has_io_error_in_chain(error: &dyn std::error::Error) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if cause.is::<std::io::Error>() {
            return true;
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Wrapper {
        inner: Option<Box<dyn std::error::Error + 'static>>,
    }

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "wrapper")
        }
    }

    impl std::error::Error for Wrapper {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.inner.as_deref()
        }
    }

    #[test]
    fn test_io_error_found_in_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let outer = Wrapper {
            inner: Some(Box::new(Wrapper {
                inner: Some(Box::new(io)),
            })),
        };
        assert!(has_io_error_in_chain(&outer));
    }

    #[test]
    fn test_no_io_error_in_chain() {
        let outer = Wrapper {
            inner: Some(Box::new(Wrapper { inner: None })),
        };
        assert!(!has_io_error_in_chain(&outer));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.service_unavailable_delay, Duration::from_secs(5));
        assert_eq!(policy.rate_limited_delay, Duration::from_secs(1));
        assert_eq!(policy.network_error_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_immediate_policy_has_no_delays() {
        let policy = RetryPolicy::immediate();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.service_unavailable_delay, Duration::ZERO);
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client("SiteScope/1.0").is_ok());
    }
}
