//! Part-of-speech categories the query builder understands.
//!
//! Tags come from a Penn-Treebank style tagger plus two pipeline-specific
//! tags: `CombinedNN` (a multi-word noun phrase merged into one node) and
//! `ADD` (a node whose label is an already resolved resource URI or date).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PosTag {
    /// `NN`
    Noun,
    /// `NNS`
    PluralNoun,
    /// `NNP`, `NNPS`, ...
    ProperNoun,
    /// Any other `NN`-prefixed tag.
    OtherNoun,
    /// `CombinedNN`
    CombinedNoun,
    /// `VB`, `VBD`, `VBZ`, ...
    Verb,
    /// `WRB`
    WhAdverb,
    /// `WP`
    WhPronoun,
    /// `JJ`
    Adjective,
    /// `CD`
    Cardinal,
    /// `ADD`
    Resolved,
    Unhandled,
}

impl PosTag {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "NN" => Self::Noun,
            "NNS" => Self::PluralNoun,
            "CombinedNN" => Self::CombinedNoun,
            "WRB" => Self::WhAdverb,
            "WP" => Self::WhPronoun,
            "JJ" => Self::Adjective,
            "CD" => Self::Cardinal,
            "ADD" => Self::Resolved,
            t if t.starts_with("NNP") => Self::ProperNoun,
            t if t.starts_with("NN") => Self::OtherNoun,
            t if t.starts_with("VB") => Self::Verb,
            _ => Self::Unhandled,
        }
    }

    /// Every `NN`-prefixed tag.
    pub fn is_noun(self) -> bool {
        matches!(
            self,
            Self::Noun | Self::PluralNoun | Self::ProperNoun | Self::OtherNoun
        )
    }

    pub fn is_wh_word(self) -> bool {
        matches!(self, Self::WhAdverb | Self::WhPronoun)
    }
}

impl From<&str> for PosTag {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Noun => "NN",
            Self::PluralNoun => "NNS",
            Self::ProperNoun => "NNP*",
            Self::OtherNoun => "NN*",
            Self::CombinedNoun => "CombinedNN",
            Self::Verb => "VB*",
            Self::WhAdverb => "WRB",
            Self::WhPronoun => "WP",
            Self::Adjective => "JJ",
            Self::Cardinal => "CD",
            Self::Resolved => "ADD",
            Self::Unhandled => "unhandled",
        };
        f.write_str(name)
    }
}
