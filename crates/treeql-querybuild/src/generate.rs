//! Recursive synthesis of query candidates from an annotated tree.
//!
//! The walk is depth-first. At every node the running candidate set is
//! replaced by its branched expansion, and the node's children are then walked
//! one after another with that expanded set. Siblings therefore compose: a
//! later sibling branches everything the earlier ones produced, and the set
//! grows multiplicatively with fan-out and depth. Identical candidates merge
//! because the set compares by value.
//!
//! A node whose (annotated, category) pair has no rule contributes nothing:
//! every candidate that reached it is dropped. That is never an error, but it
//! is logged and recorded in [`GenerationReport::unhandled`].

use std::collections::BTreeSet;

use treeql_lexicon::LabelResolver;

use crate::candidate::{Candidate, Variable, BRIDGE_PREDICATE, CONST, PROJ, ROOT_PREDICATE};
use crate::pos::PosTag;
use crate::tree::{ParseTree, ParseTreeNode};

/// A node the generator had no rule for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledNode {
    pub label: String,
    pub pos_tag: String,
    pub annotated: bool,
    /// Candidates dropped at this node.
    pub dropped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub nodes_visited: usize,
    /// Largest candidate set seen after branching any node.
    pub peak_candidates: usize,
    pub unhandled: Vec<UnhandledNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    pub candidates: BTreeSet<Candidate>,
    pub report: GenerationReport,
}

pub struct Generator<'a> {
    resolver: &'a dyn LabelResolver,
}

impl<'a> Generator<'a> {
    pub fn new(resolver: &'a dyn LabelResolver) -> Self {
        Self { resolver }
    }

    /// Walk `tree` starting from a single empty candidate.
    pub fn generate(&self, tree: &ParseTree) -> Generation {
        let seed: BTreeSet<Candidate> = [Candidate::new()].into_iter().collect();
        self.generate_from(tree, seed)
    }

    pub fn generate_from(&self, tree: &ParseTree, seed: BTreeSet<Candidate>) -> Generation {
        let mut report = GenerationReport::default();
        let candidates = self.walk(&tree.root, seed, &mut report);
        tracing::debug!(
            candidates = candidates.len(),
            peak = report.peak_candidates,
            unhandled = report.unhandled.len(),
            "generation finished"
        );
        Generation { candidates, report }
    }

    fn walk(
        &self,
        node: &ParseTreeNode,
        running: BTreeSet<Candidate>,
        report: &mut GenerationReport,
    ) -> BTreeSet<Candidate> {
        let branched = self.branch(node, &running, report);
        report.nodes_visited += 1;
        report.peak_candidates = report.peak_candidates.max(branched.len());
        node.children
            .iter()
            .fold(branched, |set, child| self.walk(child, set, report))
    }

    /// Expand `running` by the rule matching `node`.
    pub fn branch(
        &self,
        node: &ParseTreeNode,
        running: &BTreeSet<Candidate>,
        report: &mut GenerationReport,
    ) -> BTreeSet<Candidate> {
        let mut out = BTreeSet::new();
        let pos = node.pos();

        if node.is_annotated() {
            let rule: fn(&Candidate, &str, &mut BTreeSet<Candidate>) = match pos {
                PosTag::Verb => verb_variants,
                p if p.is_noun() || p == PosTag::WhAdverb => noun_variants,
                PosTag::WhPronoun => type_variants,
                _ => return self.unhandled(node, running, report),
            };
            for candidate in running {
                for uri in node.annotations() {
                    rule(candidate, uri, &mut out);
                }
            }
            return out;
        }

        match pos {
            PosTag::CombinedNoun | PosTag::ProperNoun | PosTag::Adjective | PosTag::Cardinal => {
                // Not found by entity linking ("crown" for The_Crown); search abstracts.
                for candidate in running {
                    text_variants(candidate, &node.label, &mut out);
                }
            }
            PosTag::Verb | PosTag::Noun | PosTag::PluralNoun => {
                for candidate in running {
                    text_variants(candidate, &node.label, &mut out);
                    out.insert(candidate.clone());
                }
            }
            PosTag::Resolved => {
                let labels = self.resolved_labels(&node.label);
                for candidate in running {
                    resolved_variants(candidate, &node.label, &labels, &mut out);
                }
            }
            // "Who"/"What" without a type hint carry nothing usable.
            PosTag::WhPronoun => out.extend(running.iter().cloned()),
            _ => return self.unhandled(node, running, report),
        }
        out
    }

    fn resolved_labels(&self, uri: &str) -> BTreeSet<String> {
        match self.resolver.english_labels(uri) {
            Ok(labels) => labels,
            Err(err) => {
                tracing::warn!(%uri, error = %err, "label resolution failed; continuing without labels");
                BTreeSet::new()
            }
        }
    }

    fn unhandled(
        &self,
        node: &ParseTreeNode,
        running: &BTreeSet<Candidate>,
        report: &mut GenerationReport,
    ) -> BTreeSet<Candidate> {
        tracing::warn!(
            label = %node.label,
            pos = %node.pos_tag,
            annotated = node.is_annotated(),
            dropped = running.len(),
            "no generation rule for node; branch dropped"
        );
        report.unhandled.push(UnhandledNode {
            label: node.label.clone(),
            pos_tag: node.pos_tag.clone(),
            annotated: node.is_annotated(),
            dropped: running.len(),
        });
        BTreeSet::new()
    }
}

// ============================================================================
// Rules
// ============================================================================

fn verb_variants(candidate: &Candidate, uri: &str, out: &mut BTreeSet<Candidate>) {
    out.insert(candidate.branch_with_constraint(format!("{PROJ} <{uri}> {CONST}.")));
    out.insert(candidate.branch_with_constraint(format!("{CONST} <{uri}> {PROJ}.")));
    out.insert(candidate.branch_with_constraint(format!("{CONST} {ROOT_PREDICATE} {PROJ}.")));
}

/// Nouns can be predicates too (e.g. "currency"). The forward
/// `?proj <uri> ?const` reading is deliberately not generated.
fn noun_variants(candidate: &Candidate, uri: &str, out: &mut BTreeSet<Candidate>) {
    out.insert(candidate.branch_with_constraint(format!("{CONST} <{uri}> {PROJ}.")));
    type_variants(candidate, uri, out);
}

fn type_variants(candidate: &Candidate, uri: &str, out: &mut BTreeSet<Candidate>) {
    out.insert(candidate.branch_with_constraint(format!("{CONST} a <{uri}>.")));
    out.insert(candidate.branch_with_constraint(format!("{PROJ} a <{uri}>.")));
    out.insert(candidate.clone());
}

fn text_variants(candidate: &Candidate, label: &str, out: &mut BTreeSet<Candidate>) {
    for variable in Variable::ALL {
        out.insert(candidate.branch_with_text(variable, label));
    }
}

fn resolved_variants(
    candidate: &Candidate,
    uri: &str,
    labels: &BTreeSet<String>,
    out: &mut BTreeSet<Candidate>,
) {
    out.insert(candidate.branch_with_constraint(format!("{PROJ} {BRIDGE_PREDICATE} <{uri}>.")));
    out.insert(candidate.branch_with_filter(format!("{PROJ} IN (<{uri}>)")));
    out.insert(candidate.clone());
    for label in labels {
        text_variants(candidate, label, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treeql_lexicon::{LexiconError, NoLabels, StaticLabelResolver};

    struct FailingResolver;

    impl LabelResolver for FailingResolver {
        fn english_labels(&self, _uri: &str) -> treeql_lexicon::Result<BTreeSet<String>> {
            Err(LexiconError::Status {
                endpoint: "http://localhost/sparql".to_string(),
                status: 503,
            })
        }
    }

    fn seed() -> BTreeSet<Candidate> {
        [Candidate::new()].into_iter().collect()
    }

    fn two_seeds() -> BTreeSet<Candidate> {
        [
            Candidate::new(),
            Candidate::with_constraint("?proj a <uri:Person>."),
        ]
        .into_iter()
        .collect()
    }

    fn branch(node: &ParseTreeNode, running: &BTreeSet<Candidate>) -> BTreeSet<Candidate> {
        Generator::new(&NoLabels).branch(node, running, &mut GenerationReport::default())
    }

    fn has_constraint(set: &BTreeSet<Candidate>, triple: &str) -> bool {
        set.iter().any(|c| c.constraints().contains(triple))
    }

    #[test]
    fn annotated_verb_yields_three_readings_per_uri() {
        let node = ParseTreeNode::new("founded", "VBD").with_annotation("uri:founderOf");
        let out = branch(&node, &seed());
        assert_eq!(out.len(), 3);
        assert!(has_constraint(&out, "?proj <uri:founderOf> ?const."));
        assert!(has_constraint(&out, "?const <uri:founderOf> ?proj."));
        assert!(has_constraint(&out, "?const ?proot ?proj."));
    }

    #[test]
    fn unbound_predicate_reading_is_shared_across_uris() {
        let node = ParseTreeNode::new("wrote", "VBD")
            .with_annotation("uri:author")
            .with_annotation("uri:writer");
        // 2 directed readings per uri + one shared `?proot` reading.
        assert_eq!(branch(&node, &seed()).len(), 5);
    }

    #[test]
    fn annotated_noun_skips_forward_reading_and_keeps_passthrough() {
        let node = ParseTreeNode::new("currency", "NN").with_annotation("uri:currency");
        let out = branch(&node, &seed());
        assert_eq!(out.len(), 4);
        assert!(has_constraint(&out, "?const <uri:currency> ?proj."));
        assert!(has_constraint(&out, "?const a <uri:currency>."));
        assert!(has_constraint(&out, "?proj a <uri:currency>."));
        assert!(!has_constraint(&out, "?proj <uri:currency> ?const."));
        assert!(out.contains(&Candidate::new()));
    }

    #[test]
    fn annotated_wh_adverb_uses_noun_rule() {
        let node = ParseTreeNode::new("Where", "WRB").with_annotation("uri:Place");
        assert_eq!(branch(&node, &seed()).len(), 4);
    }

    #[test]
    fn annotated_wh_pronoun_types_both_variables() {
        let node = ParseTreeNode::new("Who", "WP").with_annotation("uri:Agent");
        let out = branch(&node, &seed());
        assert_eq!(out.len(), 3);
        assert!(has_constraint(&out, "?proj a <uri:Agent>."));
        assert!(has_constraint(&out, "?const a <uri:Agent>."));
        assert!(out.contains(&Candidate::new()));
    }

    #[test]
    fn literal_categories_have_no_passthrough() {
        for pos in ["CombinedNN", "NNP", "NNPS", "JJ", "CD"] {
            let node = ParseTreeNode::new("Nobel Prize", pos);
            let running = two_seeds();
            let out = branch(&node, &running);
            assert_eq!(out.len(), 2 * running.len(), "{pos}");
            for c in &running {
                assert!(!out.contains(c), "{pos} kept a passthrough");
            }
        }
    }

    #[test]
    fn unannotated_nouns_and_verbs_keep_passthrough() {
        for pos in ["NN", "NNS", "VBZ"] {
            let node = ParseTreeNode::new("river", pos);
            let running = two_seeds();
            let out = branch(&node, &running);
            assert_eq!(out.len(), 3 * running.len(), "{pos}");
            for c in &running {
                assert!(out.contains(c), "{pos} lost its passthrough");
            }
        }
    }

    #[test]
    fn bare_wh_pronoun_passes_through() {
        let node = ParseTreeNode::new("What", "WP");
        let running = two_seeds();
        assert_eq!(branch(&node, &running), running);
    }

    #[test]
    fn resolved_node_adds_bridge_filter_and_label_searches() {
        let uri = "http://dbpedia.org/resource/Cleopatra";
        let resolver = StaticLabelResolver::new().with(uri, "Cleopatra");
        let node = ParseTreeNode::new(uri, "ADD");
        let out = Generator::new(&resolver).branch(&node, &seed(), &mut GenerationReport::default());
        assert_eq!(out.len(), 5);
        assert!(has_constraint(&out, &format!("?proj ?pbridge <{uri}>.")));
        assert!(out.iter().any(|c| c.filters().contains(&format!("?proj IN (<{uri}>)"))));
        assert!(out.contains(&Candidate::new()));
        for var in [PROJ, CONST] {
            assert!(out.iter().any(|c| c
                .exact_phrases_for(var)
                .is_some_and(|p| p.contains("Cleopatra"))));
        }
    }

    #[test]
    fn resolver_failure_means_no_label_variants() {
        let node = ParseTreeNode::new("uri:Cleopatra", "ADD");
        let mut report = GenerationReport::default();
        let out = Generator::new(&FailingResolver).branch(&node, &seed(), &mut report);
        assert_eq!(out.len(), 3);
        assert!(report.unhandled.is_empty());
    }

    #[test]
    fn unhandled_nodes_drop_candidates_and_are_reported() {
        let tree = ParseTree::new(
            ParseTreeNode::new("Who", "WP").with_child(ParseTreeNode::new("the", "DT")),
        );
        let generation = Generator::new(&NoLabels).generate(&tree);
        assert!(generation.candidates.is_empty());
        assert_eq!(generation.report.unhandled.len(), 1);
        let dropped = &generation.report.unhandled[0];
        assert_eq!(dropped.label, "the");
        assert_eq!(dropped.pos_tag, "DT");
        assert!(!dropped.annotated);
        assert_eq!(dropped.dropped, 1);
    }

    #[test]
    fn annotated_adjective_is_unhandled() {
        let node = ParseTreeNode::new("tallest", "JJ").with_annotation("uri:height");
        let mut report = GenerationReport::default();
        let out = Generator::new(&NoLabels).branch(&node, &seed(), &mut report);
        assert!(out.is_empty());
        assert!(report.unhandled[0].annotated);
    }

    #[test]
    fn siblings_compose_sequentially() {
        // root WP passthrough, then two NN siblings each tripling the set.
        let tree = ParseTree::new(
            ParseTreeNode::new("What", "WP")
                .with_child(ParseTreeNode::new("river", "NN"))
                .with_child(ParseTreeNode::new("city", "NN")),
        );
        let generation = Generator::new(&NoLabels).generate(&tree);
        assert_eq!(generation.candidates.len(), 9);
        assert_eq!(generation.report.nodes_visited, 3);
        assert_eq!(generation.report.peak_candidates, 9);
        assert!(generation.candidates.iter().any(|c| {
            c.exact_phrases_for(PROJ).is_some_and(|p| p.contains("river"))
                && c.exact_phrases_for(CONST).is_some_and(|p| p.contains("city"))
        }));
    }

    #[test]
    fn who_founded_end_to_end() {
        let tree = ParseTree::new(
            ParseTreeNode::new("Who", "WP")
                .with_child(ParseTreeNode::new("founded", "VB").with_annotation("uri:founderOf")),
        );
        let generation = Generator::new(&NoLabels).generate(&tree);
        let out = &generation.candidates;
        assert!(has_constraint(out, "?const <uri:founderOf> ?proj."));
        assert!(has_constraint(out, "?proj <uri:founderOf> ?const."));
        assert!(has_constraint(out, "?const ?proot ?proj."));
        let pair = out.iter().next().unwrap().serialize();
        for query in pair.iter() {
            assert!(query.contains("SELECT DISTINCT ?proj"));
            assert!(query.ends_with("LIMIT 12"));
        }
    }
}
