//! Semantic annotation of parse-tree nodes with ontology URIs.
//!
//! Three passes run in a fixed order, because the noun pass only touches
//! nodes that are still unannotated:
//!
//! 1. **projection**: the root's left-most child gets a type hint for the
//!    answer variable (wh-words) or a class lookup (imperative questions such
//!    as "List all books ...").
//! 2. **verbs**: verbs usually denote properties.
//! 3. **nouns**: nouns usually denote classes, sometimes properties, and fall
//!    back to the combined entity index.
//!
//! Blacklisted labels (ambiguous words like "people") are never annotated.

use std::collections::BTreeSet;

use treeql_lexicon::Lexicon;

use crate::pos::PosTag;
use crate::tree::{ParseTree, ParseTreeNode};

pub const PLACE_TYPE_IRI: &str = "http://dbpedia.org/ontology/Place";
pub const AGENT_TYPE_IRI: &str = "http://dbpedia.org/ontology/Agent";

pub const DEFAULT_BLACKLIST: [&str; 1] = ["people"];

pub struct Annotator<'a> {
    lexicon: &'a Lexicon,
    blacklist: BTreeSet<String>,
}

impl<'a> Annotator<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_blacklist<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn blacklist(&self) -> &BTreeSet<String> {
        &self.blacklist
    }

    fn is_blacklisted(&self, node: &ParseTreeNode) -> bool {
        self.blacklist.contains(&node.label)
    }

    pub fn annotate(&self, tree: &mut ParseTree) {
        self.annotate_projection(tree);
        tree.root.for_each_mut(&mut |node| self.annotate_verb(node));
        tree.root.for_each_mut(&mut |node| self.annotate_noun(node));
    }

    // ========================================================================
    // Projection heuristic
    // ========================================================================

    /// Annotate the root's left-most child only. Its own children are left to
    /// the general passes.
    pub fn annotate_projection(&self, tree: &mut ParseTree) {
        let Some(node) = tree.projection_node_mut() else {
            return;
        };
        if self.is_blacklisted(node) {
            return;
        }
        let pos = node.pos();

        if pos.is_wh_word() {
            // Only a hint towards the type of the answer.
            if let Some(uri) = wh_type_hint(&node.label) {
                node.add_annotation(uri);
            }
            return;
        }

        if !pos.is_noun() {
            tracing::error!(node = %node, "unexpected projection node category");
            return;
        }

        let label = projection_label(node).to_string();
        if node.is_leaf() {
            let classes = self.lexicon.classes(&label);
            if classes.is_empty() {
                tracing::error!(node = %node, %label, "projection noun has no class");
            }
            node.extend_annotations(classes);
            return;
        }

        // Imperative questions ("List ...", "Give me ...") put a noun phrase here.
        let classes = self.lexicon.classes(&label);
        let properties = self.lexicon.properties(&label);
        if !classes.is_empty() || !properties.is_empty() {
            node.extend_annotations(classes);
            node.extend_annotations(properties);
            return;
        }
        let entities = self.lexicon.entities(&label);
        if !entities.is_empty() {
            node.extend_annotations(entities);
        } else {
            // Left for the generator's full-text rules.
            tracing::debug!(node = %node, "projection noun not annotated");
        }
    }

    // ========================================================================
    // General passes
    // ========================================================================

    /// Verbs map to properties. A lemma replaces the surface form when the
    /// surface form misses, and then no further fallback is tried.
    pub fn annotate_verb(&self, node: &mut ParseTreeNode) {
        if node.pos() != PosTag::Verb || self.is_blacklisted(node) {
            return;
        }
        let mut found = self.lexicon.properties(&node.label);
        if found.is_empty() {
            found = match &node.lemma {
                Some(lemma) => self.lexicon.properties(lemma),
                None => self.lexicon.entities(&node.label),
            };
        }
        node.extend_annotations(found);
        tracing::debug!(node = %node, "verb annotated");
    }

    /// Nouns try classes, then properties, then the entity index on the
    /// surface form. If all miss, the lemma is looked up in all three indexes
    /// at once and the hits are merged.
    pub fn annotate_noun(&self, node: &mut ParseTreeNode) {
        if !node.pos().is_noun() || node.is_annotated() || self.is_blacklisted(node) {
            return;
        }

        let label = node.label.clone();
        let mut found = self.lexicon.classes(&label);
        if found.is_empty() {
            found = self.lexicon.properties(&label);
        }
        if found.is_empty() {
            found = self.lexicon.entities(&label);
        }
        node.extend_annotations(found);

        if !node.is_annotated() {
            if let Some(lemma) = node.lemma.clone() {
                node.extend_annotations(self.lexicon.classes(&lemma));
                node.extend_annotations(self.lexicon.properties(&lemma));
                node.extend_annotations(self.lexicon.entities(&lemma));
            }
        }

        if !node.is_annotated() {
            tracing::debug!(node = %node, "noun not annotated");
        }
    }
}

fn wh_type_hint(label: &str) -> Option<&'static str> {
    match label {
        "Where" => Some(PLACE_TYPE_IRI),
        "Who" => Some(AGENT_TYPE_IRI),
        _ => None,
    }
}

/// Plural nouns are looked up by their lemma when one is known.
fn projection_label(node: &ParseTreeNode) -> &str {
    match (&node.lemma, node.pos()) {
        (Some(lemma), PosTag::PluralNoun) => lemma,
        _ => &node.label,
    }
}
