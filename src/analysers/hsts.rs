use super::{categories, AnalyserResultItem, DocumentAnalyser, ResultType};
use crate::document::Document;

const DOCUMENTATION_URL: &str =
    "https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Strict-Transport-Security";

/// Checks that HTTPS responses carry a `Strict-Transport-Security` header
pub struct StrictTransportSecurityAnalyser;

impl DocumentAnalyser for StrictTransportSecurityAnalyser {
    fn name(&self) -> &'static str {
        "strict-transport-security"
    }

    fn analyse(&self, document: &Document) -> anyhow::Result<Vec<AnalyserResultItem>> {
        if document.url.scheme() != "https" {
            return Ok(Vec::new());
        }

        let header = document.response_headers.get("strict-transport-security");
        let item = match header {
            None => AnalyserResultItem {
                category: Some(categories::SECURITY.to_string()),
                documentation_url: Some(DOCUMENTATION_URL.to_string()),
                ..AnalyserResultItem::new(
                    ResultType::Warning,
                    "Strict-Transport-Security header not found",
                )
            },
            Some(value) => AnalyserResultItem {
                category: Some(categories::SECURITY.to_string()),
                full_message: Some(value.clone()),
                documentation_url: Some(DOCUMENTATION_URL.to_string()),
                ..AnalyserResultItem::new(
                    ResultType::Good,
                    "Strict-Transport-Security header found",
                )
            },
        };

        Ok(vec![item])
    }
}
