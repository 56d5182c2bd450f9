//! Document fetching
//!
//! One fetch fills one [`Document`]: request and response headers, status,
//! redirect target, and any error that occurred. The body comes back
//! classified by `Content-Type` so the worker knows whether to parse it as
//! HTML, CSS, or not at all. A failed fetch is not an aborted document; the
//! error lands on the document and the crawl moves on.

use super::transport::RetryingTransport;
use crate::document::Document;
use crate::url::{is_css_mime_type, is_html_mime_type, is_redirect_status, resolve};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::{Request, Response};

/// A fetched body, classified for the processing step
#[derive(Debug)]
pub enum FetchedContent {
    Html(String),
    Stylesheet(String),
    /// A 301/302 response; the target is recorded on the document
    Redirect,
    /// Fetched fine but not a content type the crawler parses
    Other,
    /// The error is recorded on the document
    Failed,
}

/// Fetches documents through the retrying transport
pub struct Fetcher {
    transport: RetryingTransport,
    user_agent: String,
    default_accept_language: Option<String>,
}

impl Fetcher {
    pub fn new(
        transport: RetryingTransport,
        user_agent: String,
        default_accept_language: Option<String>,
    ) -> Self {
        Self {
            transport,
            user_agent,
            default_accept_language,
        }
    }

    /// Fetches the document's URL and records the outcome on it
    pub async fn fetch(&self, document: &mut Document) -> FetchedContent {
        let request = match self.build_request(document) {
            Ok(request) => request,
            Err(error) => {
                record_error(document, &error);
                return FetchedContent::Failed;
            }
        };

        record_headers(request.headers(), &mut document.request_headers);

        match self.transport.send(request).await {
            Ok(response) => self.record_response(document, response).await,
            Err(error) => {
                tracing::warn!("Fetching {} failed: {}", document.url, error);
                record_error(document, &error);
                FetchedContent::Failed
            }
        }
    }

    fn build_request(&self, document: &Document) -> Result<Request, reqwest::Error> {
        let mut builder = self
            .transport
            .client()
            .get(document.url.clone())
            .header(ACCEPT, "*/*")
            .header(USER_AGENT, &self.user_agent);

        let language = document
            .language
            .as_deref()
            .or(self.default_accept_language.as_deref());
        if let Some(language) = language {
            builder = builder.header(ACCEPT_LANGUAGE, language);
        }

        builder.build()
    }

    async fn record_response(&self, document: &mut Document, response: Response) -> FetchedContent {
        let status = response.status();
        document.status = Some(status.as_u16());
        document.reason_phrase = status.canonical_reason().map(String::from);
        record_headers(response.headers(), &mut document.response_headers);

        if is_redirect_status(status.as_u16()) {
            if let Some(location) = document.response_headers.get("location") {
                document.redirect_url = resolve(&document.url, location);
            }
            return FetchedContent::Redirect;
        }

        // a missing Content-Type is treated as HTML
        let content_type = document
            .response_headers
            .get(CONTENT_TYPE.as_str())
            .cloned()
            .unwrap_or_else(|| "text/html".to_string());

        if is_html_mime_type(&content_type) {
            match response.text().await {
                Ok(body) => FetchedContent::Html(body),
                Err(error) => {
                    record_error(document, &error);
                    FetchedContent::Failed
                }
            }
        } else if is_css_mime_type(&content_type) {
            match response.text().await {
                Ok(body) => FetchedContent::Stylesheet(body),
                Err(error) => {
                    record_error(document, &error);
                    FetchedContent::Failed
                }
            }
        } else {
            FetchedContent::Other
        }
    }
}

/// Copies headers into the document's map, lowercasing names and joining
/// repeated headers with a comma
fn record_headers(
    headers: &reqwest::header::HeaderMap,
    into: &mut std::collections::BTreeMap<String, String>,
) {
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).to_string();
        into.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
}

/// Records a failure on the document: the display chain joined with
/// ` ---> `, plus the full debug rendering
fn record_error(document: &mut Document, error: &dyn std::error::Error) {
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    document.error_message = Some(parts.join(" ---> "));
    document.full_error_message = Some(format!("{error:?}"));
}
