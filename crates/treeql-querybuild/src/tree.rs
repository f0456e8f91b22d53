//! Parse trees as delivered by the NLP pipeline.
//!
//! A tree is owned by its root; children are owned by their parent. The only
//! mutable part of a node after construction is its annotation set, which the
//! annotator fills with ontology URIs and which never shrinks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::pos::PosTag;

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("failed to read parse tree: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid parse tree json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTreeNode {
    pub label: String,
    #[serde(alias = "posTag", alias = "pos")]
    pub pos_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ParseTreeNode>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    annotations: BTreeSet<String>,
}

impl ParseTreeNode {
    pub fn new(label: impl Into<String>, pos_tag: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pos_tag: pos_tag.into(),
            lemma: None,
            children: Vec::new(),
            annotations: BTreeSet::new(),
        }
    }

    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    pub fn with_child(mut self, child: ParseTreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_annotation(mut self, uri: impl Into<String>) -> Self {
        self.add_annotation(uri);
        self
    }

    pub fn pos(&self) -> PosTag {
        PosTag::parse(&self.pos_tag)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn annotations(&self) -> &BTreeSet<String> {
        &self.annotations
    }

    pub fn is_annotated(&self) -> bool {
        !self.annotations.is_empty()
    }

    pub fn add_annotation(&mut self, uri: impl Into<String>) {
        self.annotations.insert(uri.into());
    }

    pub fn extend_annotations<I, S>(&mut self, uris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.annotations.extend(uris.into_iter().map(Into::into));
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(ParseTreeNode::size).sum::<usize>()
    }

    /// Visit every node of this subtree, parents before children.
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut ParseTreeNode)) {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }
}

impl fmt::Display for ParseTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.label, self.pos_tag)?;
        if let Some(lemma) = &self.lemma {
            write!(f, " lemma={lemma}")?;
        }
        if !self.annotations.is_empty() {
            let uris: Vec<&str> = self.annotations.iter().map(String::as_str).collect();
            write!(f, " {{{}}}", uris.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseTree {
    pub root: ParseTreeNode,
}

impl ParseTree {
    pub fn new(root: ParseTreeNode) -> Self {
        Self { root }
    }

    /// Accepts either `{ "root": {..} }` or a bare root node object.
    pub fn from_json_str(text: &str) -> Result<Self, TreeError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Doc {
            Tree { root: ParseTreeNode },
            Node(ParseTreeNode),
        }
        let tree = match serde_json::from_str::<Doc>(text)? {
            Doc::Tree { root } | Doc::Node(root) => Self::new(root),
        };
        Ok(tree)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// The left-most child of the root, the node carrying the projection hint.
    pub fn projection_node_mut(&mut self) -> Option<&mut ParseTreeNode> {
        self.root.children.first_mut()
    }

    pub fn size(&self) -> usize {
        self.root.size()
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(f: &mut fmt::Formatter<'_>, node: &ParseTreeNode, depth: usize) -> fmt::Result {
            writeln!(f, "{:indent$}{node}", "", indent = depth * 2)?;
            for child in &node.children {
                write_node(f, child, depth + 1)?;
            }
            Ok(())
        }
        write_node(f, &self.root, 0)
    }
}
