//! Label lookup capabilities for treeql (boundary adapters).
//!
//! The query builder never talks to an ontology store directly. It sees the
//! knowledge base through two narrow capabilities defined here:
//!
//! - [`LexicalIndex`]: `label -> [uri]` lookups. A [`Lexicon`] bundles the three
//!   indexes the annotator consults (classes, properties, and a combined entity
//!   index used as the fallback).
//! - [`LabelResolver`]: `uri -> {english label}` lookups, used to recover the
//!   surface text of nodes the NLP pipeline already resolved to a resource.
//!
//! Both are synchronous and may block. Index misses are ordinary empty results;
//! only label resolution reports errors, and callers are expected to treat a
//! failure as "no labels".
//!
//! Implementations shipped here:
//! - [`MemoryIndex`] and [`LexiconFile`] for fixture/offline lexicons (JSON).
//! - [`SparqlLabelResolver`] (feature `http`) backed by a SPARQL 1.1 endpoint.
//! - [`StaticLabelResolver`] and [`NoLabels`] for tests and offline runs.

pub mod config;
pub mod labels;
pub mod memory;

use std::fmt;

pub use config::EndpointConfig;
#[cfg(feature = "http")]
pub use labels::SparqlLabelResolver;
pub use labels::{label_query, parse_label_bindings, LabelResolver, NoLabels, StaticLabelResolver};
pub use memory::{LexiconFile, MemoryIndex};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("http request to `{endpoint}` failed: {message}")]
    Http { endpoint: String, message: String },
    #[error("endpoint `{endpoint}` answered with status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("malformed SPARQL results: {0}")]
    Decode(String),
    #[error("failed to read lexicon file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid lexicon json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LexiconError>;

// ============================================================================
// Index capability
// ============================================================================

/// A `label -> [uri]` lookup service.
///
/// Lookups are infallible from the caller's point of view: an implementation
/// that cannot reach its backing store logs and returns an empty list.
pub trait LexicalIndex {
    fn search(&self, label: &str) -> Vec<String>;
}

impl<F> LexicalIndex for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn search(&self, label: &str) -> Vec<String> {
        self(label)
    }
}

/// The three indexes consulted during annotation.
pub struct Lexicon {
    classes: Box<dyn LexicalIndex>,
    properties: Box<dyn LexicalIndex>,
    entities: Box<dyn LexicalIndex>,
}

impl Lexicon {
    pub fn new(
        classes: impl LexicalIndex + 'static,
        properties: impl LexicalIndex + 'static,
        entities: impl LexicalIndex + 'static,
    ) -> Self {
        Self {
            classes: Box::new(classes),
            properties: Box::new(properties),
            entities: Box::new(entities),
        }
    }

    /// A lexicon where every lookup misses.
    pub fn empty() -> Self {
        Self::new(MemoryIndex::new(), MemoryIndex::new(), MemoryIndex::new())
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: LexiconFile = serde_json::from_str(text)?;
        Ok(file.into_lexicon())
    }

    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn classes(&self, label: &str) -> Vec<String> {
        self.classes.search(label)
    }

    pub fn properties(&self, label: &str) -> Vec<String> {
        self.properties.search(label)
    }

    /// The combined entity index, consulted when classes and properties miss.
    pub fn entities(&self, label: &str) -> Vec<String> {
        self.entities.search(label)
    }
}

impl fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexicon").finish_non_exhaustive()
    }
}
