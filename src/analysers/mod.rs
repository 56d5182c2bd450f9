//! Pluggable document analysers
//!
//! Analysers inspect fetched content and yield diagnostic result items
//! that are attached to the document. Three typed registries exist:
//!
//! - Document analysers see response metadata only (status, headers).
//! - HTML analysers see the parsed DOM.
//! - CSS analysers declare which targets they apply to (standalone
//!   stylesheets, `<style>` tags, `style` attributes) and run once per
//!   matching target.
//!
//! A failing analyser never aborts the document: its error is recorded as
//! a synthetic `Error` result item and the remaining analysers still run.

mod comments;
mod empty_rules;
mod hsts;
mod image_alt;
mod seo_meta;

pub use comments::CommentAnalyser;
pub use empty_rules::EmptyRuleAnalyser;
pub use hsts::StrictTransportSecurityAnalyser;
pub use image_alt::ImageAltAttributeAnalyser;
pub use seo_meta::SeoMetaAnalyser;

use crate::css::Stylesheet;
use crate::document::Document;

/// Well-known result categories
pub mod categories {
    pub const SECURITY: &str = "Security";
    pub const SEO: &str = "Seo";
    pub const PERFORMANCE: &str = "Performance";
}

/// Severity of an analyser finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Good,
    Info,
    Warning,
    Error,
}

/// One finding attached to a document
#[derive(Debug, Clone)]
pub struct AnalyserResultItem {
    pub result_type: ResultType,
    pub message: String,
    pub full_message: Option<String>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub documentation_url: Option<String>,
}

impl AnalyserResultItem {
    pub fn new(result_type: ResultType, message: impl Into<String>) -> Self {
        Self {
            result_type,
            message: message.into(),
            full_message: None,
            category: None,
            excerpt: None,
            line: None,
            column: None,
            documentation_url: None,
        }
    }
}

/// Which kind of CSS a [`CssAnalyser`] wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssTarget {
    /// A standalone stylesheet response
    Stylesheet,
    /// The contents of an inline `<style>` tag
    StyleTag,
    /// A `style="..."` attribute, parsed as a synthetic single rule
    StyleAttribute,
}

/// Arguments handed to HTML analysers
pub struct HtmlAnalysis<'a> {
    pub document: &'a Document,
    pub html: &'a scraper::Html,
}

/// Arguments handed to CSS analysers
pub struct CssAnalysis<'a> {
    pub document: &'a Document,
    pub target: CssTarget,
    pub stylesheet: &'a Stylesheet,
    /// Outer HTML of the element carrying the CSS, for tag and attribute
    /// targets
    pub element_html: Option<&'a str>,
}

/// Analyses response metadata alone
pub trait DocumentAnalyser: Send + Sync {
    fn name(&self) -> &'static str;
    fn analyse(&self, document: &Document) -> anyhow::Result<Vec<AnalyserResultItem>>;
}

/// Analyses the parsed DOM of an HTML response
pub trait HtmlAnalyser: Send + Sync {
    fn name(&self) -> &'static str;
    fn analyse(&self, args: &HtmlAnalysis<'_>) -> anyhow::Result<Vec<AnalyserResultItem>>;
}

/// Analyses a parsed rule tree for the targets it declares
pub trait CssAnalyser: Send + Sync {
    fn name(&self) -> &'static str;
    fn targets(&self) -> &[CssTarget];
    fn analyse(&self, args: &CssAnalysis<'_>) -> anyhow::Result<Vec<AnalyserResultItem>>;
}

/// The configured analyser registries for a run
///
/// Analysers run in registration order; their items are appended in the
/// order each analyser yields them.
pub struct AnalyserSet {
    document: Vec<Box<dyn DocumentAnalyser>>,
    html: Vec<Box<dyn HtmlAnalyser>>,
    css: Vec<Box<dyn CssAnalyser>>,
}

impl AnalyserSet {
    /// An empty set: nothing runs
    pub fn empty() -> Self {
        Self {
            document: Vec::new(),
            html: Vec::new(),
            css: Vec::new(),
        }
    }

    /// The built-in analyser set
    pub fn with_defaults() -> Self {
        let mut set = Self::empty();
        set.register_document(Box::new(StrictTransportSecurityAnalyser));
        set.register_html(Box::new(SeoMetaAnalyser));
        set.register_html(Box::new(ImageAltAttributeAnalyser));
        set.register_html(Box::new(CommentAnalyser));
        set.register_css(Box::new(EmptyRuleAnalyser));
        set
    }

    pub fn register_document(&mut self, analyser: Box<dyn DocumentAnalyser>) {
        self.document.push(analyser);
    }

    pub fn register_html(&mut self, analyser: Box<dyn HtmlAnalyser>) {
        self.html.push(analyser);
    }

    pub fn register_css(&mut self, analyser: Box<dyn CssAnalyser>) {
        self.css.push(analyser);
    }

    pub fn run_document(&self, document: &Document) -> Vec<AnalyserResultItem> {
        let mut items = Vec::new();
        for analyser in &self.document {
            collect(analyser.name(), analyser.analyse(document), &mut items);
        }
        items
    }

    pub fn run_html(&self, args: &HtmlAnalysis<'_>) -> Vec<AnalyserResultItem> {
        let mut items = Vec::new();
        for analyser in &self.html {
            collect(analyser.name(), analyser.analyse(args), &mut items);
        }
        items
    }

    pub fn run_css(&self, args: &CssAnalysis<'_>) -> Vec<AnalyserResultItem> {
        let mut items = Vec::new();
        for analyser in &self.css {
            if !analyser.targets().contains(&args.target) {
                continue;
            }
            collect(analyser.name(), analyser.analyse(args), &mut items);
        }
        items
    }
}

impl Default for AnalyserSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn collect(
    name: &str,
    outcome: anyhow::Result<Vec<AnalyserResultItem>>,
    items: &mut Vec<AnalyserResultItem>,
) {
    match outcome {
        Ok(mut yielded) => items.append(&mut yielded),
        Err(error) => {
            tracing::warn!("Analyser {} failed: {:#}", name, error);
            items.push(AnalyserResultItem {
                full_message: Some(format!("{error:#}")),
                ..AnalyserResultItem::new(ResultType::Error, format!("Analyser {name} failed"))
            });
        }
    }
}
