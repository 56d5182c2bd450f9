use super::{categories, AnalyserResultItem, HtmlAnalyser, HtmlAnalysis, ResultType};
use scraper::Node;

/// Flags HTML comments as removable payload
///
/// Conditional comments (`<!--[if IE]>...<![endif]-->`) are skipped since
/// they carry behaviour for the browsers that honour them.
pub struct CommentAnalyser;

impl HtmlAnalyser for CommentAnalyser {
    fn name(&self) -> &'static str {
        "comments"
    }

    fn analyse(&self, args: &HtmlAnalysis<'_>) -> anyhow::Result<Vec<AnalyserResultItem>> {
        let mut items = Vec::new();

        for node in args.html.tree.nodes() {
            let Node::Comment(comment) = node.value() else {
                continue;
            };
            let text: &str = comment;
            if text.trim_start().to_ascii_lowercase().starts_with("[if ") {
                continue;
            }
            items.push(AnalyserResultItem {
                category: Some(categories::PERFORMANCE.to_string()),
                excerpt: Some(format!("<!--{text}-->")),
                ..AnalyserResultItem::new(ResultType::Warning, "Comments are useless")
            });
        }

        Ok(items)
    }
}
