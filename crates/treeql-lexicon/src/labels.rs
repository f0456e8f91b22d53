//! `uri -> {english label}` resolution.
//!
//! Nodes tagged `ADD` carry a resource URI instead of surface text. To search
//! abstracts for them we need their human-readable label, which lives in the
//! knowledge base as `rdfs:label` literals.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::{LexiconError, Result};

pub const RDFS_LABEL_IRI: &str = "http://www.w3.org/2000/01/rdf-schema#label";

/// Resolves the English labels of a resource.
pub trait LabelResolver {
    fn english_labels(&self, uri: &str) -> Result<BTreeSet<String>>;
}

/// Build the SPARQL query selecting the English `rdfs:label`s of `uri`.
pub fn label_query(uri: &str) -> String {
    format!(
        "SELECT DISTINCT (str(?l) AS ?label) WHERE {{ <{uri}> <{RDFS_LABEL_IRI}> ?l . FILTER(langMatches(lang(?l), \"EN\")) }}"
    )
}

/// Extract the `label` binding values from a SPARQL 1.1 JSON results document.
///
/// Rows without a `label` binding are skipped; a document without
/// `results.bindings` is malformed.
pub fn parse_label_bindings(doc: &Value) -> Result<BTreeSet<String>> {
    let bindings = doc
        .get("results")
        .and_then(|r| r.get("bindings"))
        .and_then(Value::as_array)
        .ok_or_else(|| LexiconError::Decode("missing `results.bindings` array".to_string()))?;

    Ok(bindings
        .iter()
        .filter_map(|row| row.get("label"))
        .filter_map(|term| term.get("value"))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

// ============================================================================
// Offline resolvers
// ============================================================================

/// Resolver that never finds a label.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLabels;

impl LabelResolver for NoLabels {
    fn english_labels(&self, _uri: &str) -> Result<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }
}

/// Map-backed resolver.
#[derive(Debug, Default, Clone)]
pub struct StaticLabelResolver {
    labels: BTreeMap<String, BTreeSet<String>>,
}

impl StaticLabelResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uri: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.entry(uri.into()).or_default().insert(label.into());
        self
    }
}

impl LabelResolver for StaticLabelResolver {
    fn english_labels(&self, uri: &str) -> Result<BTreeSet<String>> {
        Ok(self.labels.get(uri).cloned().unwrap_or_default())
    }
}

// ============================================================================
// SPARQL endpoint resolver
// ============================================================================

#[cfg(feature = "http")]
pub use http::SparqlLabelResolver;

#[cfg(feature = "http")]
mod http {
    use std::collections::BTreeSet;

    use reqwest::blocking::Client;
    use reqwest::header::ACCEPT;
    use serde_json::Value;

    use super::{label_query, parse_label_bindings, LabelResolver};
    use crate::{EndpointConfig, LexiconError, Result};

    const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

    /// Resolves labels over the SPARQL 1.1 protocol (HTTP GET).
    #[derive(Debug, Clone)]
    pub struct SparqlLabelResolver {
        client: Client,
        config: EndpointConfig,
    }

    impl SparqlLabelResolver {
        pub fn new(config: EndpointConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(config.timeout())
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| LexiconError::Http {
                    endpoint: config.url.to_string(),
                    message: format!("failed to build http client: {e}"),
                })?;
            Ok(Self { client, config })
        }

        pub fn from_env() -> Result<Self> {
            Self::new(EndpointConfig::from_env()?)
        }

        pub fn config(&self) -> &EndpointConfig {
            &self.config
        }

        fn http_error(&self, e: reqwest::Error) -> LexiconError {
            LexiconError::Http {
                endpoint: self.config.url.to_string(),
                message: e.to_string(),
            }
        }
    }

    impl LabelResolver for SparqlLabelResolver {
        fn english_labels(&self, uri: &str) -> Result<BTreeSet<String>> {
            let query = label_query(uri);
            tracing::debug!(%uri, endpoint = %self.config.url, "resolving english labels");

            let resp = self
                .client
                .get(self.config.url.clone())
                .query(&[("query", query.as_str())])
                .header(ACCEPT, SPARQL_RESULTS_JSON)
                .send()
                .map_err(|e| self.http_error(e))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(LexiconError::Status {
                    endpoint: self.config.url.to_string(),
                    status: status.as_u16(),
                });
            }

            let doc: Value = resp.json().map_err(|e| LexiconError::Decode(e.to_string()))?;
            parse_label_bindings(&doc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn label_query_targets_english_rdfs_labels() {
        let q = label_query("http://dbpedia.org/resource/Cleopatra");
        assert!(q.contains("<http://dbpedia.org/resource/Cleopatra>"));
        assert!(q.contains("<http://www.w3.org/2000/01/rdf-schema#label>"));
        assert!(q.contains("langMatches(lang(?l), \"EN\")"));
        assert!(q.starts_with("SELECT DISTINCT (str(?l) AS ?label)"));
    }

    #[test]
    fn bindings_are_collected_as_a_set() {
        let doc = json!({
            "head": { "vars": ["label"] },
            "results": { "bindings": [
                { "label": { "type": "literal", "value": "Cleopatra" } },
                { "label": { "type": "literal", "value": "Cleopatra VII" } },
                { "label": { "type": "literal", "value": "Cleopatra" } },
                { "other": { "type": "literal", "value": "ignored" } }
            ] }
        });
        let labels = parse_label_bindings(&doc).unwrap();
        assert_eq!(
            labels.into_iter().collect::<Vec<_>>(),
            vec!["Cleopatra".to_string(), "Cleopatra VII".to_string()]
        );
    }

    #[test]
    fn empty_bindings_are_no_labels() {
        let doc = json!({ "head": { "vars": ["label"] }, "results": { "bindings": [] } });
        assert!(parse_label_bindings(&doc).unwrap().is_empty());
    }

    #[test]
    fn missing_results_is_a_decode_error() {
        let err = parse_label_bindings(&json!({ "boolean": true })).unwrap_err();
        assert!(matches!(err, LexiconError::Decode(_)));
    }

    #[test]
    fn static_resolver_returns_known_labels_only() {
        let resolver = StaticLabelResolver::new()
            .with("uri:Berlin", "Berlin")
            .with("uri:Berlin", "Berlin, Germany");
        assert_eq!(resolver.english_labels("uri:Berlin").unwrap().len(), 2);
        assert!(resolver.english_labels("uri:Paris").unwrap().is_empty());
        assert!(NoLabels.english_labels("uri:Berlin").unwrap().is_empty());
    }
}
