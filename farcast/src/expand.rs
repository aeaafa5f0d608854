//! Expansion seam: logical request to concrete requests.

use std::sync::Arc;

use farcast_core::{ApiRequest, PreparedRequest};
use serde_json::Value;

use crate::error::{Error, Result};

/// Turns one logical request into concrete, sendable requests.
///
/// Implementations must produce at least one element or fail with
/// [`Error::Expansion`]; the session treats an empty result as an error
/// either way. Each produced request must be marked prepared.
pub trait Expand: Send + Sync {
    /// Expands `request` into concrete requests.
    fn expand(&self, request: &ApiRequest) -> Result<Vec<PreparedRequest>>;
}

/// Minimal expander: resolves `{name}` template segments and renders the
/// remaining structured parameters as a query string, producing exactly
/// one concrete request.
///
/// Richer expansion — pagination, fan-out over multi-valued parameters —
/// belongs to a caller-supplied [`Expand`] implementation.
pub struct TemplateExpander {
    base_url: String,
}

impl TemplateExpander {
    /// Creates an expander resolving endpoints against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        TemplateExpander {
            base_url: base_url.into(),
        }
    }

    fn resolve_path(&self, request: &ApiRequest) -> Result<(String, Vec<String>)> {
        let mut path = String::new();
        let mut consumed = Vec::new();
        let mut rest = request.endpoint();

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                return Err(Error::Expansion(format!(
                    "unbalanced placeholder in endpoint {}",
                    request.endpoint()
                )));
            };
            path.push_str(&rest[..open]);
            let name = &rest[open + 1..open + close];
            let Some(value) = request.argument(name) else {
                return Err(Error::Expansion(format!(
                    "missing value for path parameter {name}"
                )));
            };
            path.push_str(&render(value));
            consumed.push(name.to_owned());
            rest = &rest[open + close + 1..];
        }
        path.push_str(rest);
        Ok((path, consumed))
    }
}

impl Expand for TemplateExpander {
    fn expand(&self, request: &ApiRequest) -> Result<Vec<PreparedRequest>> {
        let (path, consumed) = self.resolve_path(request)?;

        let query: Vec<String> = request
            .params()
            .iter()
            .filter(|(name, _)| !consumed.iter().any(|c| c == name.as_str()))
            .map(|(name, value)| format!("{name}={}", render(value)))
            .collect();

        let mut url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }

        let origin = Arc::new(request.clone());
        let prepared = PreparedRequest::build(request.method().clone(), url, request.endpoint())
            .with_origin(origin)
            .mark_prepared();
        Ok(vec![prepared])
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn resolves_path_and_query() {
        let expander = TemplateExpander::new("https://api.example.net/latest/");
        let request = ApiRequest::new(Method::GET, "/markets/{region_id}/orders/")
            .param("region_id", 10000002)
            .param("type_id", 34);

        let prepared = expander.expand(&request).unwrap();
        assert_eq!(prepared.len(), 1);
        let only = &prepared[0];
        assert!(only.is_prepared());
        assert_eq!(
            only.url(),
            "https://api.example.net/latest/markets/10000002/orders/?type_id=34"
        );
        assert_eq!(only.route(), "/markets/{region_id}/orders/");
    }

    #[test]
    fn missing_path_parameter_fails() {
        let expander = TemplateExpander::new("https://api.example.net/latest");
        let request = ApiRequest::new(Method::GET, "/markets/{region_id}/orders/");
        assert!(matches!(
            expander.expand(&request),
            Err(Error::Expansion(_))
        ));
    }

    #[test]
    fn extras_resolve_placeholders_but_not_query() {
        let expander = TemplateExpander::new("https://api.example.net/latest");
        let request = ApiRequest::new(Method::GET, "/universe/types/{type_id}/")
            .extra("type_id", 34)
            .extra("note", "ignored");

        let prepared = expander.expand(&request).unwrap();
        assert_eq!(
            prepared[0].url(),
            "https://api.example.net/latest/universe/types/34/"
        );
    }
}
