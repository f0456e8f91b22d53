//! Rendering candidates as SPARQL.
//!
//! Each candidate yields two queries that differ only in their full-text
//! clauses:
//!
//! - **fuzzy**: every token of a variable, minus stopwords, as `token~1`
//!   joined with `AND` (tolerates inflection such as photographer/photographers);
//! - **exact**: every whole phrase of a variable, quoted, joined with `AND`.
//!
//! Full-text clauses use the Jena `text:query` property function over the
//! abstract predicate and retrieve at most `text_hits` matches; the outer
//! query narrows that to `limit` results.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fmt::Write;

use crate::candidate::Candidate;

pub const TEXT_PREFIX_IRI: &str = "http://jena.apache.org/text#";
pub const ABSTRACT_PREDICATE_IRI: &str = "http://dbpedia.org/ontology/abstract";
pub const TEXT_HITS: usize = 1000;
pub const RESULT_LIMIT: usize = 12;
pub const STOPWORDS: [&str; 5] = ["of", "and", "in", "name", "was"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    pub text_prefix_iri: String,
    pub text_predicate_iri: String,
    pub text_hits: usize,
    pub limit: usize,
    pub stopwords: BTreeSet<String>,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            text_prefix_iri: TEXT_PREFIX_IRI.to_string(),
            text_predicate_iri: ABSTRACT_PREDICATE_IRI.to_string(),
            text_hits: TEXT_HITS,
            limit: RESULT_LIMIT,
            stopwords: STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The two renderings of one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryPair {
    pub fuzzy: String,
    pub exact: String,
}

impl QueryPair {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [self.fuzzy.as_str(), self.exact.as_str()].into_iter()
    }
}

impl IntoIterator for QueryPair {
    type Item = String;
    type IntoIter = std::array::IntoIter<String, 2>;

    fn into_iter(self) -> Self::IntoIter {
        [self.fuzzy, self.exact].into_iter()
    }
}

impl Candidate {
    pub fn serialize(&self) -> QueryPair {
        self.serialize_with(&SerializeOptions::default())
    }

    pub fn serialize_with(&self, options: &SerializeOptions) -> QueryPair {
        QueryPair {
            fuzzy: render(self, options, TextMode::Fuzzy),
            exact: render(self, options, TextMode::Exact),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pair = self.serialize();
        write!(f, "{}\n{}", pair.fuzzy, pair.exact)
    }
}

#[derive(Debug, Clone, Copy)]
enum TextMode {
    Fuzzy,
    Exact,
}

fn render(candidate: &Candidate, options: &SerializeOptions, mode: TextMode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "PREFIX text: <{}>", options.text_prefix_iri);
    out.push_str("SELECT DISTINCT ?proj WHERE {\n");

    let (source, drop_stopwords): (&BTreeMap<String, BTreeSet<String>>, bool) = match mode {
        TextMode::Fuzzy => (candidate.fuzzy_tokens(), true),
        TextMode::Exact => (candidate.exact_phrases(), false),
    };
    for (variable, terms) in source {
        let terms: Vec<String> = terms
            .iter()
            .filter(|t| !(drop_stopwords && options.stopwords.contains(t.as_str())))
            .map(|t| match mode {
                TextMode::Fuzzy => format!("{}~1", escape_literal(t)),
                TextMode::Exact => format!("\"{}\"", escape_literal(t)),
            })
            .collect();
        if terms.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            "  {variable} text:query (<{}> '{}' {}).",
            options.text_predicate_iri,
            terms.join(" AND "),
            options.text_hits
        );
    }

    for constraint in candidate.constraints() {
        let _ = writeln!(out, "  {constraint}");
    }
    for filter in candidate.filters() {
        let _ = writeln!(out, "  FILTER ({filter}).");
    }
    out.push_str("}\n");
    let _ = write!(out, "LIMIT {}", options.limit);
    out
}

/// Escape text for use inside a single-quoted SPARQL literal.
fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}
