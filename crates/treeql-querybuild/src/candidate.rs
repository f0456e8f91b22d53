//! Query candidates: one hypothesis about what the question asks.
//!
//! A [`Candidate`] accumulates triple patterns, filter expressions, and the
//! full-text tokens to search for per variable. Candidates are plain values:
//! two candidates with the same content are equal, hash and order the same,
//! and collapse inside a set. Generator rules never mutate a shared candidate;
//! they clone it and extend the clone.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Binding whose values answer the question.
pub const PROJ: &str = "?proj";
/// Constant or bridge resource the answer is related to.
pub const CONST: &str = "?const";
/// Unbound predicate between `?const` and `?proj`.
pub const ROOT_PREDICATE: &str = "?proot";
/// Unbound predicate from `?proj` to an already resolved resource.
pub const BRIDGE_PREDICATE: &str = "?pbridge";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    Proj,
    Const,
}

impl Variable {
    pub const ALL: [Variable; 2] = [Variable::Proj, Variable::Const];

    pub fn as_str(self) -> &'static str {
        match self {
            Variable::Proj => PROJ,
            Variable::Const => CONST,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Candidate {
    constraints: BTreeSet<String>,
    filters: BTreeSet<String>,
    fuzzy_tokens: BTreeMap<String, BTreeSet<String>>,
    exact_phrases: BTreeMap<String, BTreeSet<String>>,
}

impl Candidate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constraint(triple: impl Into<String>) -> Self {
        let mut candidate = Self::new();
        candidate.add_constraint(triple);
        candidate
    }

    pub fn add_constraint(&mut self, triple: impl Into<String>) {
        self.constraints.insert(triple.into());
    }

    pub fn add_filter(&mut self, expr: impl Into<String>) {
        self.filters.insert(expr.into());
    }

    /// Search the abstracts for `label` on behalf of `variable`.
    ///
    /// The label is split on whitespace and `-` into single fuzzy tokens, and
    /// kept whole as an exact phrase. Both accumulate across calls.
    pub fn add_text_constraint(&mut self, variable: &str, label: &str) {
        let tokens = self.fuzzy_tokens.entry(variable.to_string()).or_default();
        tokens.extend(
            label
                .split(|c: char| c.is_whitespace() || c == '-')
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        );
        self.exact_phrases
            .entry(variable.to_string())
            .or_default()
            .insert(label.to_string());
    }

    /// A copy of `self` with one more triple pattern.
    pub fn branch_with_constraint(&self, triple: impl Into<String>) -> Self {
        let mut branch = self.clone();
        branch.add_constraint(triple);
        branch
    }

    /// A copy of `self` with one more filter.
    pub fn branch_with_filter(&self, expr: impl Into<String>) -> Self {
        let mut branch = self.clone();
        branch.add_filter(expr);
        branch
    }

    /// A copy of `self` with one more text constraint.
    pub fn branch_with_text(&self, variable: Variable, label: &str) -> Self {
        let mut branch = self.clone();
        branch.add_text_constraint(variable.as_str(), label);
        branch
    }

    /// Whether any triple pattern contains `fragment`.
    pub fn constraints_contains(&self, fragment: &str) -> bool {
        self.constraints.iter().any(|c| c.contains(fragment))
    }

    pub fn constraints(&self) -> &BTreeSet<String> {
        &self.constraints
    }

    pub fn filters(&self) -> &BTreeSet<String> {
        &self.filters
    }

    pub fn fuzzy_tokens(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.fuzzy_tokens
    }

    pub fn exact_phrases(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.exact_phrases
    }

    pub fn fuzzy_tokens_for(&self, variable: &str) -> Option<&BTreeSet<String>> {
        self.fuzzy_tokens.get(variable)
    }

    pub fn exact_phrases_for(&self, variable: &str) -> Option<&BTreeSet<String>> {
        self.exact_phrases.get(variable)
    }

    /// True for the seed candidate: nothing constrained yet.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
            && self.filters.is_empty()
            && self.fuzzy_tokens.is_empty()
            && self.exact_phrases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_constraint_splits_on_space_and_hyphen() {
        let mut c = Candidate::new();
        c.add_text_constraint(PROJ, "anti-apartheid  activist");
        let tokens: Vec<&str> = c.fuzzy_tokens_for(PROJ).unwrap().iter().map(String::as_str).collect();
        assert_eq!(tokens, vec!["activist", "anti", "apartheid"]);
        let phrases = c.exact_phrases_for(PROJ).unwrap();
        assert!(phrases.contains("anti-apartheid  activist"));
    }

    #[test]
    fn text_constraints_accumulate_per_variable() {
        let mut c = Candidate::new();
        c.add_text_constraint(PROJ, "Nobel Prize");
        c.add_text_constraint(PROJ, "Physics");
        c.add_text_constraint(CONST, "Einstein");
        assert_eq!(c.fuzzy_tokens_for(PROJ).unwrap().len(), 3);
        assert_eq!(c.exact_phrases_for(PROJ).unwrap().len(), 2);
        assert_eq!(c.fuzzy_tokens_for(CONST).unwrap().len(), 1);
    }

    #[test]
    fn clone_is_independent_on_every_field() {
        let mut original = Candidate::with_constraint("?const a <uri:City>.");
        original.add_filter("?proj IN (<uri:Berlin>)");
        original.add_text_constraint(PROJ, "river");

        let snapshot = original.clone();
        let mut branch = original.clone();
        branch.add_constraint("?proj a <uri:River>.");
        branch.add_filter("?proj != <uri:Rhine>");
        branch.add_text_constraint(PROJ, "Nile");
        branch.add_text_constraint(CONST, "Egypt");

        assert_eq!(original, snapshot);
        assert_eq!(original.constraints().len(), 1);
        assert_eq!(original.filters().len(), 1);
        assert_eq!(original.fuzzy_tokens_for(PROJ).unwrap().len(), 1);
        assert_eq!(original.exact_phrases_for(PROJ).unwrap().len(), 1);
        assert!(original.exact_phrases_for(CONST).is_none());
        assert_ne!(original, branch);
    }

    #[test]
    fn equal_content_collapses_in_a_set() {
        let a = Candidate::new().branch_with_constraint("?const <uri:p> ?proj.");
        let b = Candidate::new().branch_with_constraint("?const <uri:p> ?proj.");
        let set: BTreeSet<Candidate> = [a, b, Candidate::new()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn constraints_contains_matches_fragments() {
        let c = Candidate::with_constraint("?proj <http://dbpedia.org/ontology/birthPlace> ?const.");
        assert!(c.constraints_contains("birthPlace"));
        assert!(!c.constraints_contains("deathPlace"));
        assert!(!Candidate::new().constraints_contains(""));
    }

    #[test]
    fn seed_candidate_is_empty() {
        assert!(Candidate::new().is_empty());
        assert!(!Candidate::new().branch_with_text(Variable::Const, "x").is_empty());
    }

    #[test]
    fn candidate_dumps_as_json() {
        let mut c = Candidate::with_constraint("?proj a <uri:Lake>.");
        c.add_text_constraint(CONST, "Lake Baikal");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["constraints"][0], "?proj a <uri:Lake>.");
        assert_eq!(json["exact_phrases"]["?const"][0], "Lake Baikal");
    }
}
