//! Turning parsed conditions into canonical predicates over the paraphrase table.
//!
//! Users compare phrases, lengths and probabilities the way they read them;
//! the table stores signed length differences and negative log probabilities.
//! Normalization bridges the two: it picks the column, orients the operator
//! and converts the operand.

use std::fmt;

use tracing::warn;

use crate::parser::{Comparison, Condition, PhraseOperand, PivotOp, PivotValue, RelationRef, Side};
use crate::relation::Relation;

/// Columns of the `paraphrase` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Source,
    Target,
    Identity,
    SrcLen,
    TgtLen,
    LenDiff,
    Cost,
    PivotCount,
    Pivots,
    Relation,
    Distance,
    SamePos,
    TargetDuplicate,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Field::Source => "source",
            Field::Target => "target",
            Field::Identity => "identity",
            Field::SrcLen => "srclen",
            Field::TgtLen => "tgtlen",
            Field::LenDiff => "lendiff",
            Field::Cost => "pe2e1",
            Field::PivotCount => "pivotnum",
            Field::Pivots => "pivots",
            Field::Relation => "relation",
            Field::Distance => "distance",
            Field::SamePos => "samepos",
            Field::TargetDuplicate => "tgtdupl",
        }
    }
    /// Fields a count query may be grouped by.
    pub fn groupable(name: &str) -> Option<Field> {
        match name {
            "source" => Some(Field::Source),
            "target" => Some(Field::Target),
            "identity" => Some(Field::Identity),
            "srclen" => Some(Field::SrcLen),
            "tgtlen" => Some(Field::TgtLen),
            "lendiff" => Some(Field::LenDiff),
            "relation" => Some(Field::Relation),
            "pivotnum" => Some(Field::PivotCount),
            "distance" => Some(Field::Distance),
            "samepos" => Some(Field::SamePos),
            "tgtdupl" => Some(Field::TargetDuplicate),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Compare(Comparison),
    Glob,
    Like,
}

impl Operator {
    pub fn sql(self) -> &'static str {
        match self {
            Operator::Compare(c) => c.symbol(),
            Operator::Glob => "glob",
            Operator::Like => "like",
        }
    }
}

/// Part-of-speech agreement between source and target, as stored in `samepos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamePos {
    Same,
    Different,
    Unknown,
}

impl SamePos {
    pub fn code(self) -> i64 {
        match self {
            SamePos::Same => 1,
            SamePos::Different => 0,
            SamePos::Unknown => -1,
        }
    }
    pub fn from_code(code: i64) -> SamePos {
        match code {
            1 => SamePos::Same,
            0 => SamePos::Different,
            _ => SamePos::Unknown,
        }
    }
    pub fn label(self) -> &'static str {
        match self {
            SamePos::Same => "same",
            SamePos::Different => "different",
            SamePos::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{}", i64::from(*b)),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Real(r) => write!(f, "{r:?}"),
            Literal::Text(t) => write!(f, "'{}'", t.replace('\'', "''")),
        }
    }
}

impl rusqlite::ToSql for Literal {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        match self {
            Literal::Bool(b) => b.to_sql(),
            Literal::Int(i) => i.to_sql(),
            Literal::Real(r) => r.to_sql(),
            Literal::Text(t) => t.to_sql(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub field: Field,
    pub op: Operator,
    pub value: Literal,
}

impl Term {
    pub fn new(field: Field, op: Operator, value: Literal) -> Self {
        Self { field, op, value }
    }
    pub fn compare(field: Field, op: Comparison, value: Literal) -> Self {
        Self::new(field, Operator::Compare(op), value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Term(Term),
    /// Holds when any of the terms holds.
    AnyOf(Vec<Term>),
}

impl Predicate {
    pub fn terms(&self) -> &[Term] {
        match self {
            Predicate::Term(term) => std::slice::from_ref(term),
            Predicate::AnyOf(terms) => terms,
        }
    }
    pub fn constrains(&self, field: Field) -> bool {
        self.terms().iter().any(|t| t.field == field)
    }
    pub fn constrains_identity(&self) -> bool {
        self.constrains(Field::Identity)
    }
}

impl From<Term> for Predicate {
    fn from(term: Term) -> Self {
        Predicate::Term(term)
    }
}

/// A matched condition that produced no predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedPredicate {
    pub condition: String,
    pub reason: String,
}

impl fmt::Display for UnresolvedPredicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ignored condition '{}': {}", self.condition, self.reason)
    }
}

/// What a comparison is mapped onto; decides whether the operator is mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// `source <op> target` mapped onto `lendiff <op'> 0`.
    LengthDifference(Side),
    /// `prob <op> p` mapped onto `pe2e1 <op'> -ln(p)`.
    Probability,
    Direct,
}

const MIRRORED: [(Comparison, Comparison); 6] = [
    (Comparison::Lt, Comparison::Gt),
    (Comparison::Gt, Comparison::Lt),
    (Comparison::Le, Comparison::Ge),
    (Comparison::Ge, Comparison::Le),
    (Comparison::Eq, Comparison::Eq),
    (Comparison::Ne, Comparison::Ne),
];

fn orient(kind: Kind, op: Comparison) -> Comparison {
    let mirror = match kind {
        Kind::LengthDifference(lhs) => lhs == Side::Source,
        Kind::Probability => true,
        Kind::Direct => false,
    };
    if !mirror {
        return op;
    }
    MIRRORED
        .iter()
        .find(|(from, _)| *from == op)
        .map(|(_, to)| *to)
        .unwrap_or(op)
}

pub fn normalize(condition: &Condition) -> Result<Predicate, UnresolvedPredicate> {
    let unresolved = |reason: &str| UnresolvedPredicate {
        condition: condition.to_string(),
        reason: reason.to_string(),
    };
    let predicate = match condition {
        Condition::SourceTargetCompare { lhs, op, by_words, .. } => match op {
            Comparison::Eq | Comparison::Ne => {
                if by_words.is_some() {
                    warn!(condition = %condition, "length clause ignored on identity comparison");
                }
                Term::compare(Field::Identity, Comparison::Eq, Literal::Bool(*op == Comparison::Eq)).into()
            }
            _ => {
                let oriented = orient(Kind::LengthDifference(*lhs), *op);
                match by_words {
                    Some(n) => {
                        let n = i64::from(*n);
                        let lendiff = match oriented {
                            Comparison::Gt | Comparison::Ge => n,
                            _ => -n,
                        };
                        Term::compare(Field::LenDiff, Comparison::Eq, Literal::Int(lendiff)).into()
                    }
                    None => Term::compare(Field::LenDiff, oriented, Literal::Int(0)).into(),
                }
            }
        },
        Condition::SourceTargetPhrase { side, op, operand } => match operand {
            PhraseOperand::Words(n) => {
                let field = match side {
                    Side::Source => Field::SrcLen,
                    Side::Target => Field::TgtLen,
                };
                Term::compare(field, *op, Literal::Int(i64::from(*n))).into()
            }
            PhraseOperand::Phrase(phrase) => {
                let field = match side {
                    Side::Source => Field::Source,
                    Side::Target => Field::Target,
                };
                let op = if phrase.contains(['*', '?']) {
                    Operator::Glob
                } else {
                    Operator::Compare(Comparison::Eq)
                };
                Term::new(field, op, Literal::Text(phrase.clone())).into()
            }
        },
        Condition::RelationCompare { op, relation } => {
            let id = match relation {
                RelationRef::Id(id) if *id <= u64::from(Relation::MAX_ID) => *id as i64,
                RelationRef::Id(_) => return Err(unresolved("relation id outside the taxonomy")),
                RelationRef::Name(name) => match Relation::from_name(name) {
                    Some(relation) => i64::from(relation.id()),
                    None => return Err(unresolved("unknown relation name")),
                },
            };
            Term::compare(Field::Relation, *op, Literal::Int(id)).into()
        }
        Condition::PivotCompare { op, value } => match (op, value) {
            (PivotOp::Include, value) => {
                let text = match value {
                    PivotValue::Text(t) => t.clone(),
                    PivotValue::Count(n) => n.to_string(),
                };
                Predicate::AnyOf(vec![
                    Term::new(Field::Pivots, Operator::Like, Literal::Text(format!("%\"{}:%", escape_like(&text)))),
                    Term::compare(Field::Pivots, Comparison::Eq, Literal::Text(text)),
                ])
            }
            (PivotOp::Compare(op), PivotValue::Count(n)) => match i64::try_from(*n) {
                Ok(n) => Term::compare(Field::PivotCount, *op, Literal::Int(n)).into(),
                Err(_) => return Err(unresolved("pivot count out of range")),
            },
            (PivotOp::Compare(_), PivotValue::Text(_)) => {
                return Err(unresolved("pivot text can only be used with include"));
            }
        },
        Condition::DistanceCompare { op, distance } => {
            Term::compare(Field::Distance, orient(Kind::Direct, *op), Literal::Int(i64::from(*distance))).into()
        }
        Condition::ProbabilityCompare { op, probability } => {
            Term::compare(Field::Cost, orient(Kind::Probability, *op), Literal::Real(-probability.ln())).into()
        }
    };
    Ok(predicate)
}

/// Escapes the `like` wildcards; the store uses `\` as escape character.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
