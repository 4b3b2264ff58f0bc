//! The fixed WordNet relation vocabulary.
//!
//! Every paraphrase rule carries a precomputed relation id between its source
//! and target phrase. Queries may refer to a relation either by that id or by
//! its name, so the vocabulary is kept as a bidirectional map.

use bimap::BiMap;
use lazy_static::lazy_static;
use std::fmt;

pub type RelationId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// At least one of the phrases is not found in WordNet.
    NotInTaxonomy,
    Derivation,
    Synonym,
    Antonym,
    /// The target is a hypernym of the source.
    Hypernym,
    /// The target is a hyponym of the source.
    Hyponym,
    /// Source and target share a common hypernym.
    CoHyponym,
    /// Both phrases are in WordNet but none of the other relations hold.
    Undefined,
    Pertainym,
    Holonym,
    Meronym,
}

const RELATIONS: [Relation; 11] = [
    Relation::NotInTaxonomy,
    Relation::Derivation,
    Relation::Synonym,
    Relation::Antonym,
    Relation::Hypernym,
    Relation::Hyponym,
    Relation::CoHyponym,
    Relation::Undefined,
    Relation::Pertainym,
    Relation::Holonym,
    Relation::Meronym,
];

lazy_static! {
    static ref VOCABULARY: BiMap<&'static str, RelationId> = {
        let mut names = BiMap::new();
        for relation in RELATIONS {
            names.insert(relation.name(), relation.id());
        }
        names
    };
}

impl Relation {
    pub const MAX_ID: RelationId = 10;

    pub fn id(self) -> RelationId {
        self as RelationId
    }
    pub fn name(self) -> &'static str {
        match self {
            Relation::NotInTaxonomy => "not in WN",
            Relation::Derivation => "derivation",
            Relation::Synonym => "synonym",
            Relation::Antonym => "antonym",
            Relation::Hypernym => "hypernym",
            Relation::Hyponym => "hyponym",
            Relation::CoHyponym => "co-hyponym",
            Relation::Undefined => "undefined relation",
            Relation::Pertainym => "pertainym",
            Relation::Holonym => "holonym",
            Relation::Meronym => "meronym",
        }
    }
    pub fn from_id(id: i64) -> Option<Relation> {
        usize::try_from(id).ok().and_then(|i| RELATIONS.get(i).copied())
    }
    /// Looks a relation up by name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Relation> {
        let name = name.trim().to_lowercase();
        let name = if name == "not in wn" { "not in WN" } else { name.as_str() };
        VOCABULARY
            .get_by_left(name)
            .and_then(|id| Relation::from_id(i64::from(*id)))
    }
    pub fn all() -> &'static [Relation] {
        &RELATIONS
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Name for a stored relation id, empty for ids outside the vocabulary.
pub fn relation_name(id: i64) -> &'static str {
    RelationId::try_from(id)
        .ok()
        .and_then(|id| VOCABULARY.get_by_right(&id).copied())
        .unwrap_or("")
}

/// Id for a relation name, if it is part of the vocabulary.
pub fn relation_id(name: &str) -> Option<RelationId> {
    Relation::from_name(name).map(Relation::id)
}
