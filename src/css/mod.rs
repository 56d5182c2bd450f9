//! Tolerant CSS rule tree
//!
//! The crawler needs two things from CSS: the `url(...)` references buried
//! in property values, and a rule tree the CSS analysers can inspect.
//! Parsing must be tolerant: unknown at-rules, invalid selectors, and
//! malformed declarations are skipped, never fatal.

mod parser;

pub use parser::{parse_inline_style, parse_stylesheet};

/// A parsed stylesheet
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

/// One rule: a prelude (selector or at-rule header), its declarations,
/// and any nested rules (`@media` and friends)
#[derive(Debug, Clone)]
pub struct CssRule {
    pub prelude: String,
    pub declarations: Vec<CssDeclaration>,
    pub rules: Vec<CssRule>,
}

impl CssRule {
    /// True if the rule body holds neither declarations nor nested rules
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.rules.is_empty()
    }
}

/// A `name: value` declaration with the raw value text preserved
#[derive(Debug, Clone)]
pub struct CssDeclaration {
    pub name: String,
    pub value: String,
}

impl CssDeclaration {
    /// The declaration rendered back as `name: value`, used as the
    /// excerpt for references it produces
    pub fn text(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }
}

/// A `url(...)` reference found in a declaration value
#[derive(Debug, Clone)]
pub struct CssUrlReference {
    /// The raw URL text, still relative to the stylesheet
    pub url: String,
    /// The declaration that contained it
    pub excerpt: String,
}

/// Collects every `url(...)` reference in the rule tree
///
/// Each declaration value is split on commas and every segment is run
/// through the tolerant `url()` scanner independently, so multi-value
/// properties (`background: url(a.png), url(b.png)`) yield all their
/// references.
pub fn collect_url_references(stylesheet: &Stylesheet) -> Vec<CssUrlReference> {
    let mut references = Vec::new();
    collect_from_rules(&stylesheet.rules, &mut references);
    references
}

fn collect_from_rules(rules: &[CssRule], out: &mut Vec<CssUrlReference>) {
    for rule in rules {
        for declaration in &rule.declarations {
            for segment in declaration.value.split(',') {
                if let Some(url) = crate::url::parse_css_url(segment) {
                    out.push(CssUrlReference {
                        url,
                        excerpt: declaration.text(),
                    });
                }
            }
        }
        collect_from_rules(&rule.rules, out);
    }
}
