//! In-memory indexes and the JSON lexicon fixture format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{LexicalIndex, Lexicon};

/// A `label -> [uri]` map. Lookups are exact on the label.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryIndex {
    entries: BTreeMap<String, Vec<String>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `uri` under `label`, keeping the insertion order and skipping repeats.
    pub fn insert(&mut self, label: impl Into<String>, uri: impl Into<String>) {
        let uris = self.entries.entry(label.into()).or_default();
        let uri = uri.into();
        if !uris.contains(&uri) {
            uris.push(uri);
        }
    }

    pub fn with(mut self, label: impl Into<String>, uri: impl Into<String>) -> Self {
        self.insert(label, uri);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LexicalIndex for MemoryIndex {
    fn search(&self, label: &str) -> Vec<String> {
        self.entries.get(label).cloned().unwrap_or_default()
    }
}

impl<L: Into<String>, U: Into<String>> FromIterator<(L, U)> for MemoryIndex {
    fn from_iter<I: IntoIterator<Item = (L, U)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (label, uri) in iter {
            index.insert(label, uri);
        }
        index
    }
}

/// On-disk shape of a lexicon fixture:
///
/// ```json
/// {
///   "classes":    { "city": ["http://dbpedia.org/ontology/City"] },
///   "properties": { "founded": ["http://dbpedia.org/ontology/foundedBy"] },
///   "entities":   { "lake": ["http://dbpedia.org/ontology/Lake"] }
/// }
/// ```
///
/// Missing sections are empty indexes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconFile {
    #[serde(default)]
    pub classes: MemoryIndex,
    #[serde(default)]
    pub properties: MemoryIndex,
    #[serde(default)]
    pub entities: MemoryIndex,
}

impl LexiconFile {
    pub fn into_lexicon(self) -> Lexicon {
        Lexicon::new(self.classes, self.properties, self.entities)
    }
}
