use url::Url;

/// MIME types treated as HTML documents
const HTML_MIME_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// MIME types treated as CSS stylesheets
const CSS_MIME_TYPES: &[&str] = &["text/css"];

/// MIME types recognized as JavaScript for `<script type="...">` filtering
const JAVASCRIPT_MIME_TYPES: &[&str] = &[
    "application/ecmascript",
    "application/javascript",
    "application/x-ecmascript",
    "application/x-javascript",
    "text/ecmascript",
    "text/javascript",
    "text/javascript1.0",
    "text/javascript1.1",
    "text/javascript1.2",
    "text/javascript1.3",
    "text/javascript1.4",
    "text/javascript1.5",
    "text/jscript",
    "text/livescript",
    "text/x-ecmascript",
    "text/x-javascript",
];

/// Returns true if the MIME type denotes an HTML document
///
/// Comparison is case-insensitive and ignores any `;charset=...` suffix.
pub fn is_html_mime_type(mime_type: &str) -> bool {
    matches_any(mime_type, HTML_MIME_TYPES)
}

/// Returns true if the MIME type denotes a CSS stylesheet
pub fn is_css_mime_type(mime_type: &str) -> bool {
    matches_any(mime_type, CSS_MIME_TYPES)
}

/// Returns true if the MIME type denotes JavaScript
pub fn is_javascript_mime_type(mime_type: &str) -> bool {
    matches_any(mime_type, JAVASCRIPT_MIME_TYPES)
}

fn matches_any(mime_type: &str, candidates: &[&str]) -> bool {
    let essence = mime_type.split(';').next().unwrap_or("").trim();
    candidates
        .iter()
        .any(|candidate| essence.eq_ignore_ascii_case(candidate))
}

/// Returns true if the status code is one the crawler follows as a redirect
///
/// Only 301 (Moved Permanently) and 302 (Found) are followed. Other 3xx
/// responses are recorded as terminal statuses.
pub fn is_redirect_status(status: u16) -> bool {
    status == 301 || status == 302
}

/// Returns true if the URL uses a fetchable scheme (`http` or `https`)
pub fn is_http_protocol(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}

/// Returns true if both URLs share the same host
pub fn is_same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str()
}

/// Returns a copy of the URL with any fragment component removed
pub fn strip_fragment(url: &Url) -> Url {
    if url.fragment().is_none() {
        return url.clone();
    }
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped
}
