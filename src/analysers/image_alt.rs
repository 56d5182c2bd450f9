use super::{categories, AnalyserResultItem, HtmlAnalyser, HtmlAnalysis, ResultType};
use scraper::Selector;

/// Flags `<img>` elements that load an image but declare no `alt` text
pub struct ImageAltAttributeAnalyser;

impl HtmlAnalyser for ImageAltAttributeAnalyser {
    fn name(&self) -> &'static str {
        "image-alt-attribute"
    }

    fn analyse(&self, args: &HtmlAnalysis<'_>) -> anyhow::Result<Vec<AnalyserResultItem>> {
        let selector =
            Selector::parse("img").map_err(|e| anyhow::anyhow!("invalid selector: {e:?}"))?;

        let mut items = Vec::new();
        for image in args.html.select(&selector) {
            let src = image.value().attr("src").unwrap_or("");
            let alt = image.value().attr("alt").unwrap_or("");
            if !src.is_empty() && alt.is_empty() {
                items.push(AnalyserResultItem {
                    category: Some(categories::SEO.to_string()),
                    excerpt: Some(image.html()),
                    ..AnalyserResultItem::new(
                        ResultType::Warning,
                        "Image should have an \"alt\" attribute",
                    )
                });
            }
        }

        Ok(items)
    }
}
