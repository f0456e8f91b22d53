//! treeql query building: parse tree → SPARQL candidates.
//!
//! ```text
//!  parse tree ──► Annotator ──► annotated tree ──► Generator ──► {Candidate} ──► SPARQL
//!                   │                                 │                           (fuzzy + exact
//!                   ▼                                 ▼                            per candidate)
//!               Lexicon                         LabelResolver
//!   (classes / properties / entities)          (ADD nodes only)
//! ```
//!
//! - [`annotate`]: assigns ontology URIs to tree nodes.
//! - [`generate`]: branches a set of [`Candidate`]s over the annotated tree.
//! - [`candidate`] / [`serialize`]: the candidate value and its two SPARQL
//!   renderings (fuzzy and exact full-text search).
//!
//! [`QueryBuilder`] runs the whole pipeline for one question.

pub mod annotate;
pub mod candidate;
pub mod generate;
pub mod pos;
pub mod serialize;
pub mod tree;

use std::collections::BTreeSet;

use treeql_lexicon::{LabelResolver, Lexicon};

pub use annotate::Annotator;
pub use candidate::{Candidate, Variable};
pub use generate::{Generation, GenerationReport, Generator, UnhandledNode};
pub use pos::PosTag;
pub use serialize::{QueryPair, SerializeOptions};
pub use tree::{ParseTree, ParseTreeNode, TreeError};

/// Everything produced for one question.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub generation: Generation,
    /// Distinct query strings, fuzzy and exact variants of every candidate.
    pub queries: Vec<String>,
}

pub struct QueryBuilder<'a> {
    lexicon: &'a Lexicon,
    resolver: &'a dyn LabelResolver,
    blacklist: Option<BTreeSet<String>>,
    options: SerializeOptions,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(lexicon: &'a Lexicon, resolver: &'a dyn LabelResolver) -> Self {
        Self {
            lexicon,
            resolver,
            blacklist: None,
            options: SerializeOptions::default(),
        }
    }

    pub fn with_blacklist<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_options(mut self, options: SerializeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn annotator(&self) -> Annotator<'a> {
        let annotator = Annotator::new(self.lexicon);
        match &self.blacklist {
            Some(labels) => annotator.with_blacklist(labels.iter().cloned()),
            None => annotator,
        }
    }

    /// Annotate `tree` in place, generate candidates and render them.
    pub fn build(&self, tree: &mut ParseTree) -> BuildOutcome {
        self.annotator().annotate(tree);
        let generation = Generator::new(self.resolver).generate(tree);

        let queries: BTreeSet<String> = generation
            .candidates
            .iter()
            .flat_map(|c| c.serialize_with(&self.options))
            .collect();
        tracing::debug!(
            candidates = generation.candidates.len(),
            queries = queries.len(),
            "built queries"
        );

        BuildOutcome {
            generation,
            queries: queries.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treeql_lexicon::{MemoryIndex, NoLabels};

    #[test]
    fn builder_annotates_then_generates() {
        let lexicon = Lexicon::new(
            MemoryIndex::new(),
            MemoryIndex::new().with("founded", "uri:founderOf"),
            MemoryIndex::new(),
        );
        let mut tree = ParseTree::new(
            ParseTreeNode::new("founded", "VBD")
                .with_child(ParseTreeNode::new("Who", "WP")),
        );
        let outcome = QueryBuilder::new(&lexicon, &NoLabels).build(&mut tree);

        assert!(tree.root.annotations().contains("uri:founderOf"));
        assert!(tree.root.children[0]
            .annotations()
            .contains(annotate::AGENT_TYPE_IRI));
        // 3 verb readings, each then typed twice or passed through.
        assert_eq!(outcome.generation.candidates.len(), 9);
        assert!(outcome
            .queries
            .iter()
            .any(|q| q.contains("?const <uri:founderOf> ?proj.")
                && q.contains("?proj a <http://dbpedia.org/ontology/Agent>.")));
        assert!(outcome.queries.iter().all(|q| q.ends_with("LIMIT 12")));
    }

    #[test]
    fn builder_blacklist_overrides_default() {
        let lexicon = Lexicon::new(
            MemoryIndex::new().with("people", "uri:Person"),
            MemoryIndex::new(),
            MemoryIndex::new(),
        );
        let tree = ParseTree::new(
            ParseTreeNode::new("live", "VBP").with_child(ParseTreeNode::new("people", "NNS")),
        );

        let mut default_tree = tree.clone();
        QueryBuilder::new(&lexicon, &NoLabels).build(&mut default_tree);
        assert!(!default_tree.root.children[0].is_annotated());

        let mut open_tree = tree;
        QueryBuilder::new(&lexicon, &NoLabels)
            .with_blacklist(["persons"])
            .build(&mut open_tree);
        assert!(open_tree.root.children[0].annotations().contains("uri:Person"));
    }
}
