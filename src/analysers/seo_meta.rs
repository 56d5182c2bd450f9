use super::{categories, AnalyserResultItem, HtmlAnalyser, HtmlAnalysis, ResultType};
use scraper::{Html, Selector};

/// Checks SEO-relevant metadata: title, description, and the social meta
/// tag groups (Open Graph, Twitter, Facebook, App Links)
pub struct SeoMetaAnalyser;

impl HtmlAnalyser for SeoMetaAnalyser {
    fn name(&self) -> &'static str {
        "seo-meta"
    }

    fn analyse(&self, args: &HtmlAnalysis<'_>) -> anyhow::Result<Vec<AnalyserResultItem>> {
        let html = args.html;
        let mut items = vec![analyse_title(html), analyse_description(html)];

        items.extend(analyse_meta_group(
            html,
            "property",
            "og:",
            "Page has Open Graph meta tags",
        ));
        items.extend(analyse_meta_group(
            html,
            "name",
            "twitter:",
            "Page has Twitter meta tags",
        ));
        items.extend(analyse_meta_group(
            html,
            "property",
            "fb:",
            "Page has Facebook meta tags",
        ));
        items.extend(analyse_meta_group(
            html,
            "property",
            "al:",
            "Page has App Link meta tags",
        ));

        Ok(items)
    }
}

fn analyse_title(html: &Html) -> AnalyserResultItem {
    let title = Selector::parse("title")
        .ok()
        .and_then(|selector| {
            html.select(&selector)
                .next()
                .map(|element| element.text().collect::<String>().trim().to_string())
        })
        .filter(|title| !title.is_empty());

    match title {
        None => AnalyserResultItem {
            category: Some(categories::SEO.to_string()),
            ..AnalyserResultItem::new(ResultType::Warning, "Page has no title")
        },
        Some(title) => AnalyserResultItem {
            category: Some(categories::SEO.to_string()),
            excerpt: Some(title),
            ..AnalyserResultItem::new(ResultType::Info, "Page has a title")
        },
    }
}

fn analyse_description(html: &Html) -> AnalyserResultItem {
    let description = Selector::parse("meta")
        .ok()
        .and_then(|selector| {
            html.select(&selector)
                .filter(|meta| {
                    meta.value()
                        .attr("name")
                        .map(|name| name.eq_ignore_ascii_case("description"))
                        .unwrap_or(false)
                })
                .last()
                .and_then(|meta| meta.value().attr("content"))
                .map(|content| content.to_string())
        })
        .filter(|description| !description.is_empty());

    match description {
        None => AnalyserResultItem {
            category: Some(categories::SEO.to_string()),
            ..AnalyserResultItem::new(ResultType::Warning, "Page has no description")
        },
        Some(description) => AnalyserResultItem {
            category: Some(categories::SEO.to_string()),
            excerpt: Some(description),
            ..AnalyserResultItem::new(ResultType::Info, "Page has a description")
        },
    }
}

/// Reports presence of a social meta tag group, with the matched tags
/// listed in the excerpt as `key: content` lines
fn analyse_meta_group(
    html: &Html,
    attribute: &str,
    prefix: &str,
    message: &str,
) -> Option<AnalyserResultItem> {
    let selector = Selector::parse("meta").ok()?;
    let mut excerpt = String::new();

    for meta in html.select(&selector) {
        let key = match meta.value().attr(attribute) {
            Some(key) if key.to_ascii_lowercase().starts_with(prefix) => key,
            _ => continue,
        };
        let content = meta.value().attr("content").unwrap_or("");
        excerpt.push_str(key);
        excerpt.push_str(": ");
        excerpt.push_str(content);
        excerpt.push('\n');
    }

    if excerpt.is_empty() {
        return None;
    }

    Some(AnalyserResultItem {
        category: Some(categories::SEO.to_string()),
        excerpt: Some(excerpt),
        ..AnalyserResultItem::new(ResultType::Info, message)
    })
}
