//! HTML and CSS content processing
//!
//! Workers hand fetched bodies to this module, which parses them, runs the
//! matching analysers, and extracts every outbound reference. The DOM type
//! is not `Send`, so everything here is synchronous and returns owned data;
//! callers invoke it between await points.

use crate::analysers::{AnalyserResultItem, AnalyserSet, CssAnalysis, CssTarget, HtmlAnalysis};
use crate::css::{collect_url_references, parse_inline_style, parse_stylesheet, Stylesheet};
use crate::document::{Document, HtmlError};
use crate::url::{parse_srcset, resolve};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// An outbound reference extracted from a document body
#[derive(Debug, Clone)]
pub struct ExtractedLink {
    pub url: Url,
    /// Set for `hreflang` alternate links, which are fetched per language
    pub language: Option<String>,
    /// The element or declaration the reference came from
    pub excerpt: Option<String>,
}

/// Everything processing an HTML body produced
#[derive(Debug, Default)]
pub struct PageOutcome {
    pub title: Option<String>,
    pub html_errors: Vec<HtmlError>,
    /// Set when the page declared a `<meta http-equiv="refresh">` target;
    /// link extraction is skipped for such pages
    pub redirect_url: Option<Url>,
    pub links: Vec<ExtractedLink>,
    pub analyser_items: Vec<AnalyserResultItem>,
}

/// Everything processing a standalone stylesheet produced
#[derive(Debug, Default)]
pub struct StylesheetOutcome {
    pub links: Vec<ExtractedLink>,
    pub analyser_items: Vec<AnalyserResultItem>,
}

/// Parses an HTML body, runs the HTML and CSS analysers, and extracts
/// outbound references
///
/// A meta-refresh page is treated like a redirect response: its target is
/// reported and no links or CSS are extracted, though the HTML analysers
/// still see the page.
pub fn process_html(document: &Document, body: &str, analysers: &AnalyserSet) -> PageOutcome {
    let html = Html::parse_document(body);

    let mut outcome = PageOutcome {
        title: extract_title(&html),
        html_errors: html
            .errors
            .iter()
            .map(|error| HtmlError::from_message(error.to_string()))
            .collect(),
        ..PageOutcome::default()
    };

    outcome.analyser_items = analysers.run_html(&HtmlAnalysis {
        document,
        html: &html,
    });

    if let Some(target) = meta_refresh_target(&html, &document.url) {
        outcome.redirect_url = Some(target);
        return outcome;
    }

    extract_links(document, &html, analysers, &mut outcome);
    outcome
}

/// Parses a stylesheet body, runs the CSS analysers, and extracts the
/// `url(...)` references resolved against the stylesheet URL
pub fn process_stylesheet(
    document: &Document,
    body: &str,
    analysers: &AnalyserSet,
) -> StylesheetOutcome {
    let stylesheet = parse_stylesheet(body);

    let analyser_items = analysers.run_css(&CssAnalysis {
        document,
        target: CssTarget::Stylesheet,
        stylesheet: &stylesheet,
        element_html: None,
    });

    StylesheetOutcome {
        links: stylesheet_links(&document.url, &stylesheet),
        analyser_items,
    }
}

// selector literals in this module are statically valid
fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

fn extract_title(html: &Html) -> Option<String> {
    html.select(&sel("title"))
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Finds a `<meta http-equiv="refresh" content="N; url=...">` target
fn meta_refresh_target(html: &Html, base: &Url) -> Option<Url> {
    for meta in html.select(&sel("meta[http-equiv]")) {
        let equiv = meta.value().attr("http-equiv").unwrap_or("");
        if !equiv.eq_ignore_ascii_case("refresh") {
            continue;
        }
        let content = meta.value().attr("content").unwrap_or("");
        if let Some(target) = parse_refresh_content(content) {
            return resolve(base, &target);
        }
    }
    None
}

/// Pulls the `url=` part out of a refresh `content` value
fn parse_refresh_content(content: &str) -> Option<String> {
    for part in content.split(';') {
        let part = part.trim();
        let Some(prefix) = part.get(..4) else {
            continue;
        };
        if prefix.eq_ignore_ascii_case("url=") {
            let target = part[4..].trim().trim_matches(|c| c == '"' || c == '\'');
            if !target.is_empty() {
                return Some(target.to_string());
            }
        }
    }
    None
}

fn extract_links(
    document: &Document,
    html: &Html,
    analysers: &AnalyserSet,
    outcome: &mut PageOutcome,
) {
    let base = &document.url;

    for element in html.select(&sel("a[href], area[href]")) {
        push_attr_link(base, &element, "href", &mut outcome.links);
    }

    for element in html.select(&sel("link[href]")) {
        push_alternate_link(base, &element, &mut outcome.links);
    }

    for element in html.select(&sel("script[src]")) {
        let script_type = element.value().attr("type").unwrap_or("");
        if script_type.is_empty() || crate::url::is_javascript_mime_type(script_type) {
            push_attr_link(base, &element, "src", &mut outcome.links);
        }
    }

    for element in html.select(&sel("img, source")) {
        push_attr_link(base, &element, "src", &mut outcome.links);
        push_srcset_links(base, &element, &mut outcome.links);
    }

    for element in html.select(&sel("track[src], audio[src], iframe[src]")) {
        push_attr_link(base, &element, "src", &mut outcome.links);
    }

    for element in html.select(&sel("object[data]")) {
        push_attr_link(base, &element, "data", &mut outcome.links);
    }

    for element in html.select(&sel("video")) {
        push_attr_link(base, &element, "src", &mut outcome.links);
        push_attr_link(base, &element, "poster", &mut outcome.links);
    }

    for element in html.select(&sel("style")) {
        let css: String = element.text().collect();
        let stylesheet = parse_stylesheet(&css);
        let element_html = element.html();
        outcome
            .analyser_items
            .extend(analysers.run_css(&CssAnalysis {
                document,
                target: CssTarget::StyleTag,
                stylesheet: &stylesheet,
                element_html: Some(&element_html),
            }));
        outcome.links.extend(stylesheet_links(base, &stylesheet));
    }

    for element in html.select(&sel("[style]")) {
        let value = element.value().attr("style").unwrap_or("");
        if value.trim().is_empty() {
            continue;
        }
        let stylesheet = parse_inline_style(value);
        let element_html = element.html();
        outcome
            .analyser_items
            .extend(analysers.run_css(&CssAnalysis {
                document,
                target: CssTarget::StyleAttribute,
                stylesheet: &stylesheet,
                element_html: Some(&element_html),
            }));
        outcome.links.extend(stylesheet_links(base, &stylesheet));
    }
}

fn push_attr_link(base: &Url, element: &ElementRef<'_>, attr: &str, out: &mut Vec<ExtractedLink>) {
    let Some(value) = element.value().attr(attr) else {
        return;
    };
    let Some(url) = resolve(base, value) else {
        return;
    };
    out.push(ExtractedLink {
        url,
        language: None,
        excerpt: Some(element.html()),
    });
}

/// `<link>` elements: an `alternate` link carrying `hreflang` is pushed
/// twice, once under its language and once plain, so both identities get
/// fetched
fn push_alternate_link(base: &Url, element: &ElementRef<'_>, out: &mut Vec<ExtractedLink>) {
    let Some(value) = element.value().attr("href") else {
        return;
    };
    let Some(url) = resolve(base, value) else {
        return;
    };
    let excerpt = element.html();

    let rel = element.value().attr("rel").unwrap_or("");
    let is_alternate = rel
        .split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case("alternate"));
    let hreflang = element
        .value()
        .attr("hreflang")
        .map(str::trim)
        .filter(|language| !language.is_empty());

    if is_alternate {
        if let Some(language) = hreflang {
            out.push(ExtractedLink {
                url: url.clone(),
                language: Some(language.to_string()),
                excerpt: Some(excerpt.clone()),
            });
        }
    }

    out.push(ExtractedLink {
        url,
        language: None,
        excerpt: Some(excerpt),
    });
}

fn push_srcset_links(base: &Url, element: &ElementRef<'_>, out: &mut Vec<ExtractedLink>) {
    let Some(value) = element.value().attr("srcset") else {
        return;
    };
    for candidate in parse_srcset(value) {
        if let Some(url) = resolve(base, &candidate) {
            out.push(ExtractedLink {
                url,
                language: None,
                excerpt: Some(element.html()),
            });
        }
    }
}

fn stylesheet_links(base: &Url, stylesheet: &Stylesheet) -> Vec<ExtractedLink> {
    collect_url_references(stylesheet)
        .into_iter()
        .filter_map(|reference| {
            resolve(base, &reference.url).map(|url| ExtractedLink {
                url,
                language: None,
                excerpt: Some(reference.excerpt),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document::new(Url::parse("http://a.test/dir/page.html").unwrap(), None)
    }

    fn links_of(body: &str) -> Vec<ExtractedLink> {
        process_html(&document(), body, &AnalyserSet::empty()).links
    }

    fn urls_of(body: &str) -> Vec<String> {
        links_of(body)
            .into_iter()
            .map(|link| link.url.to_string())
            .collect()
    }

    #[test]
    fn test_title_extracted() {
        let outcome = process_html(
            &document(),
            "<html><head><title> Home </title></head><body></body></html>",
            &AnalyserSet::empty(),
        );
        assert_eq!(outcome.title.as_deref(), Some("Home"));
    }

    #[test]
    fn test_anchor_and_area_links() {
        let urls = urls_of(concat!(
            r#"<a href="/x">x</a>"#,
            r#"<map><area href="b.html"></map>"#,
        ));
        assert_eq!(urls, vec!["http://a.test/x", "http://a.test/dir/b.html"]);
    }

    #[test]
    fn test_anchor_excerpt_is_element_html() {
        let links = links_of(r#"<a href="/x">x</a>"#);
        assert_eq!(links[0].excerpt.as_deref(), Some(r#"<a href="/x">x</a>"#));
    }

    #[test]
    fn test_script_type_filter() {
        let urls = urls_of(concat!(
            r#"<script src="/a.js"></script>"#,
            r#"<script src="/b.js" type="text/javascript"></script>"#,
            r#"<script src="/c.js" type="application/json"></script>"#,
        ));
        assert_eq!(urls, vec!["http://a.test/a.js", "http://a.test/b.js"]);
    }

    #[test]
    fn test_hreflang_alternate_pushed_twice() {
        let links = links_of(r#"<link rel="alternate" hreflang="fr" href="/fr">"#);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].language.as_deref(), Some("fr"));
        assert_eq!(links[1].language, None);
        assert_eq!(links[0].url, links[1].url);
    }

    #[test]
    fn test_plain_link_pushed_once() {
        let links = links_of(r#"<link rel="stylesheet" href="/style.css">"#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].language, None);
    }

    #[test]
    fn test_media_elements() {
        let urls = urls_of(concat!(
            r#"<img src="/i.png" srcset="/i-2x.png 2x">"#,
            r#"<video src="/v.mp4" poster="/v.jpg"></video>"#,
            r#"<audio src="/a.ogg"></audio>"#,
            r#"<object data="/o.swf"></object>"#,
            r#"<iframe src="/frame.html"></iframe>"#,
        ));
        assert!(urls.contains(&"http://a.test/i.png".to_string()));
        assert!(urls.contains(&"http://a.test/i-2x.png".to_string()));
        assert!(urls.contains(&"http://a.test/v.mp4".to_string()));
        assert!(urls.contains(&"http://a.test/v.jpg".to_string()));
        assert!(urls.contains(&"http://a.test/a.ogg".to_string()));
        assert!(urls.contains(&"http://a.test/o.swf".to_string()));
        assert!(urls.contains(&"http://a.test/frame.html".to_string()));
    }

    #[test]
    fn test_style_tag_urls_extracted() {
        let links = links_of("<style>body { background: url(\"/bg.png\"); }</style>");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url.as_str(), "http://a.test/bg.png");
        assert_eq!(
            links[0].excerpt.as_deref(),
            Some("background: url(\"/bg.png\")")
        );
    }

    #[test]
    fn test_style_attribute_urls_extracted() {
        let links = links_of(r#"<div style="background: url('x.gif')"></div>"#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url.as_str(), "http://a.test/dir/x.gif");
    }

    #[test]
    fn test_meta_refresh_reported_and_extraction_skipped() {
        let outcome = process_html(
            &document(),
            concat!(
                r#"<html><head><meta http-equiv="refresh" content="0; url=/moved"></head>"#,
                r#"<body><a href="/ignored">x</a></body></html>"#,
            ),
            &AnalyserSet::empty(),
        );
        assert_eq!(
            outcome.redirect_url.as_ref().map(|u| u.as_str()),
            Some("http://a.test/moved")
        );
        assert!(outcome.links.is_empty());
    }

    #[test]
    fn test_refresh_content_variants() {
        assert_eq!(parse_refresh_content("5; url=/a"), Some("/a".to_string()));
        assert_eq!(
            parse_refresh_content("0;URL='http://b.test/'"),
            Some("http://b.test/".to_string())
        );
        assert_eq!(parse_refresh_content("5"), None);
        assert_eq!(parse_refresh_content("0; url="), None);
    }

    #[test]
    fn test_stylesheet_processing() {
        let document = Document::new(Url::parse("http://a.test/css/site.css").unwrap(), None);
        let outcome = process_stylesheet(
            &document,
            ".hero { background: url(../img/hero.jpg); }\n.empty {}",
            &AnalyserSet::with_defaults(),
        );
        assert_eq!(outcome.links.len(), 1);
        assert_eq!(outcome.links[0].url.as_str(), "http://a.test/img/hero.jpg");
        assert!(outcome
            .analyser_items
            .iter()
            .any(|item| item.message == "Rule is empty"));
    }

    #[test]
    fn test_html_analysers_run_on_refresh_page() {
        let outcome = process_html(
            &document(),
            r#"<html><head><meta http-equiv="refresh" content="0; url=/m"></head><body></body></html>"#,
            &AnalyserSet::with_defaults(),
        );
        assert!(outcome
            .analyser_items
            .iter()
            .any(|item| item.message == "Page has no title"));
    }
}
