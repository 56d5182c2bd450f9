use super::{categories, AnalyserResultItem, CssAnalyser, CssAnalysis, CssTarget, ResultType};
use crate::css::CssRule;

const ALL_TARGETS: &[CssTarget] = &[
    CssTarget::Stylesheet,
    CssTarget::StyleTag,
    CssTarget::StyleAttribute,
];

/// Flags rules with neither declarations nor nested rules
pub struct EmptyRuleAnalyser;

impl CssAnalyser for EmptyRuleAnalyser {
    fn name(&self) -> &'static str {
        "empty-rules"
    }

    fn targets(&self) -> &[CssTarget] {
        ALL_TARGETS
    }

    fn analyse(&self, args: &CssAnalysis<'_>) -> anyhow::Result<Vec<AnalyserResultItem>> {
        let mut items = Vec::new();
        for rule in &args.stylesheet.rules {
            visit(rule, args, &mut items);
        }
        Ok(items)
    }
}

fn visit(rule: &CssRule, args: &CssAnalysis<'_>, items: &mut Vec<AnalyserResultItem>) {
    if rule.is_empty() {
        let excerpt = match args.target {
            // the attribute itself is the most useful context to show
            CssTarget::StyleAttribute => args.element_html.map(|html| html.to_string()),
            _ => Some(format!("{} {{}}", rule.prelude)),
        };
        items.push(AnalyserResultItem {
            category: Some(categories::PERFORMANCE.to_string()),
            excerpt,
            ..AnalyserResultItem::new(ResultType::Warning, "Rule is empty")
        });
    }

    for nested in &rule.rules {
        visit(nested, args, items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parse_stylesheet;
    use crate::document::Document;
    use url::Url;

    fn run(css: &str, target: CssTarget, element_html: Option<&str>) -> Vec<AnalyserResultItem> {
        let document = Document::new(Url::parse("http://a.test/").unwrap(), None);
        let stylesheet = parse_stylesheet(css);
        EmptyRuleAnalyser
            .analyse(&CssAnalysis {
                document: &document,
                target,
                stylesheet: &stylesheet,
                element_html,
            })
            .unwrap()
    }

    #[test]
    fn test_empty_rule_flagged() {
        let items = run(".a {}", CssTarget::Stylesheet, None);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].message, "Rule is empty");
        assert_eq!(items[0].excerpt.as_deref(), Some(".a {}"));
    }

    #[test]
    fn test_populated_rule_passes() {
        let items = run(".a { color: red; }", CssTarget::Stylesheet, None);
        assert!(items.is_empty());
    }

    #[test]
    fn test_nested_empty_rule_flagged() {
        let items = run("@media screen { .a {} }", CssTarget::Stylesheet, None);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].excerpt.as_deref(), Some(".a {}"));
    }

    #[test]
    fn test_grouping_rule_with_children_passes() {
        let items = run(
            "@media screen { .a { color: red; } }",
            CssTarget::Stylesheet,
            None,
        );
        assert!(items.is_empty());
    }

    #[test]
    fn test_style_attribute_uses_element_html() {
        let element = r#"<p style=""></p>"#;
        let items = run("x{}", CssTarget::StyleAttribute, Some(element));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].excerpt.as_deref(), Some(element));
    }
}
