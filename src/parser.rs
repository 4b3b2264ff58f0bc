//! Query recognition.
//!
//! A query line is matched against `paraquery.pest` and turned into a
//! [`ParsedQuery`]. Each binary condition comes out as one tagged
//! [`Condition`] variant, chosen by whichever grammar alternative matched, so
//! later stages never have to guess the shape from which fields are present.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use std::fmt;

use crate::error::{ParaqueryError, Result};

#[derive(Parser)]
#[grammar = "paraquery.pest"]
struct QueryParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub fn keyword(self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Gt => ">",
            Comparison::Le => "<=",
            Comparison::Ge => ">=",
        }
    }
    fn from_symbol(symbol: &str) -> Result<Comparison> {
        match symbol {
            "=" | "is" => Ok(Comparison::Eq),
            "!=" => Ok(Comparison::Ne),
            "<" => Ok(Comparison::Lt),
            ">" => Ok(Comparison::Gt),
            "<=" => Ok(Comparison::Le),
            ">=" => Ok(Comparison::Ge),
            other => Err(ParaqueryError::parse(format!("unknown operator '{other}'"))),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Right-hand side of a `source|target <op> ...` condition that is not itself a side.
#[derive(Debug, Clone, PartialEq)]
pub enum PhraseOperand {
    Phrase(String),
    Words(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelationRef {
    Id(u64),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotOp {
    Include,
    Compare(Comparison),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PivotValue {
    Count(u64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    SourceTargetCompare { lhs: Side, op: Comparison, rhs: Side, by_words: Option<u32> },
    SourceTargetPhrase { side: Side, op: Comparison, operand: PhraseOperand },
    RelationCompare { op: Comparison, relation: RelationRef },
    PivotCompare { op: PivotOp, value: PivotValue },
    DistanceCompare { op: Comparison, distance: u32 },
    ProbabilityCompare { op: Comparison, probability: f64 },
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Condition::SourceTargetCompare { lhs, op, rhs, by_words } => {
                write!(f, "{} {} {}", lhs.keyword(), op, rhs.keyword())?;
                if let Some(n) = by_words {
                    write!(f, " by {n} words")?;
                }
                Ok(())
            }
            Condition::SourceTargetPhrase { side, op, operand } => match operand {
                PhraseOperand::Phrase(p) => write!(f, "{} {} \"{}\"", side.keyword(), op, p),
                PhraseOperand::Words(n) => write!(f, "{} {} {} words", side.keyword(), op, n),
            },
            Condition::RelationCompare { op, relation } => match relation {
                RelationRef::Id(id) => write!(f, "relation {op} {id}"),
                RelationRef::Name(name) => write!(f, "relation {op} \"{name}\""),
            },
            Condition::PivotCompare { op, value } => {
                let op = match op {
                    PivotOp::Include => "include",
                    PivotOp::Compare(c) => c.symbol(),
                };
                match value {
                    PivotValue::Count(n) => write!(f, "pivots {op} {n}"),
                    PivotValue::Text(t) => write!(f, "pivots {op} \"{t}\""),
                }
            }
            Condition::DistanceCompare { op, distance } => write!(f, "distance {op} {distance}"),
            Condition::ProbabilityCompare { op, probability } => write!(f, "prob {op} {probability}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Most,
    Least,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryDirective {
    /// `same`/`identical` (true) or `different`/`non-identical` (false).
    Identity(bool),
    Probable(Rank),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryBody {
    Conditions(Vec<Condition>),
    Directive(UnaryDirective),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub count: bool,
    pub body: QueryBody,
}

pub fn parse_query(text: &str) -> Result<ParsedQuery> {
    let query = QueryParser::parse(Rule::query, text)?
        .next()
        .ok_or_else(|| ParaqueryError::parse("empty query"))?;
    let mut count = false;
    let mut body = None;
    for pair in query.into_inner() {
        match pair.as_rule() {
            Rule::count => count = true,
            Rule::conditions => {
                let conditions = pair.into_inner().map(parse_condition).collect::<Result<Vec<_>>>()?;
                body = Some(QueryBody::Conditions(conditions));
            }
            Rule::ident_directive => {
                let same = matches!(pair.as_str(), "same" | "identical");
                body = Some(QueryBody::Directive(UnaryDirective::Identity(same)));
            }
            Rule::prob_directive => {
                let rank = match pair.into_inner().next().map(|p| p.as_str()) {
                    Some("least") => Rank::Least,
                    _ => Rank::Most,
                };
                body = Some(QueryBody::Directive(UnaryDirective::Probable(rank)));
            }
            _ => (),
        }
    }
    let body = body.ok_or_else(|| ParaqueryError::parse("query has no condition"))?;
    Ok(ParsedQuery { count, body })
}

fn parse_condition(pair: Pair<Rule>) -> Result<Condition> {
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();
    let mut next = || inner.next().ok_or_else(|| ParaqueryError::parse(format!("incomplete {rule:?}")));
    let condition = match rule {
        Rule::side_compare => {
            let lhs = parse_side(next()?);
            let op = Comparison::from_symbol(next()?.as_str())?;
            let rhs = parse_side(next()?);
            let by_words = match next() {
                Ok(clause) => Some(parse_count(first_inner(clause)?)?),
                Err(_) => None,
            };
            Condition::SourceTargetCompare { lhs, op, rhs, by_words }
        }
        Rule::side_phrase => {
            let side = parse_side(next()?);
            let op = Comparison::from_symbol(next()?.as_str())?;
            let operand = next()?;
            let operand = match operand.as_rule() {
                Rule::word_count => PhraseOperand::Words(parse_count(first_inner(operand)?)?),
                _ => PhraseOperand::Phrase(unquote(operand)),
            };
            Condition::SourceTargetPhrase { side, op, operand }
        }
        Rule::prob_compare => {
            let op = Comparison::from_symbol(next()?.as_str())?;
            let probability = parse_probability(next()?.as_str())?;
            Condition::ProbabilityCompare { op, probability }
        }
        Rule::relation_compare => {
            let op = Comparison::from_symbol(next()?.as_str())?;
            let value = next()?;
            let relation = match value.as_rule() {
                Rule::integer => RelationRef::Id(parse_integer(value.as_str())?),
                _ => RelationRef::Name(unquote(value)),
            };
            Condition::RelationCompare { op, relation }
        }
        Rule::pivot_compare => {
            let op = match next()?.as_str() {
                "include" => PivotOp::Include,
                symbol => PivotOp::Compare(Comparison::from_symbol(symbol)?),
            };
            let value = next()?;
            let value = match value.as_rule() {
                Rule::integer => PivotValue::Count(parse_integer(value.as_str())?),
                _ => PivotValue::Text(unquote(value)),
            };
            Condition::PivotCompare { op, value }
        }
        Rule::distance_compare => {
            let op = Comparison::from_symbol(next()?.as_str())?;
            let distance = parse_count(next()?)?;
            Condition::DistanceCompare { op, distance }
        }
        other => return Err(ParaqueryError::parse(format!("unexpected {other:?}"))),
    };
    Ok(condition)
}

fn first_inner(pair: Pair<Rule>) -> Result<Pair<Rule>> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| ParaqueryError::parse(format!("incomplete {rule:?}")))
}

fn parse_side(pair: Pair<Rule>) -> Side {
    match pair.as_str() {
        "source" => Side::Source,
        _ => Side::Target,
    }
}

fn parse_integer(text: &str) -> Result<u64> {
    text.parse::<u64>()
        .map_err(|e| ParaqueryError::parse(format!("bad integer '{text}': {e}")))
}

fn parse_count(pair: Pair<Rule>) -> Result<u32> {
    let text = pair.as_str();
    text.parse::<u32>()
        .map_err(|e| ParaqueryError::parse(format!("bad integer '{text}': {e}")))
}

fn parse_probability(text: &str) -> Result<f64> {
    let p = text
        .parse::<f64>()
        .map_err(|e| ParaqueryError::parse(format!("bad probability '{text}': {e}")))?;
    if p > 0.0 && p < 1.0 {
        Ok(p)
    } else if p == 1.0 && text.starts_with("0.") {
        Err(ParaqueryError::parse(format!("probability {text} rounds to 1, which is outside (0, 1)")))
    } else if p == 0.0 && text.contains(|c: char| matches!(c, '1'..='9')) {
        Err(ParaqueryError::parse(format!("probability {text} rounds to 0, which is outside (0, 1)")))
    } else {
        Err(ParaqueryError::parse(format!("probability {text} is outside (0, 1)")))
    }
}

// the phrase rule keeps its quotes, the inner rule holds the text
fn unquote(pair: Pair<Rule>) -> String {
    match pair.into_inner().next() {
        Some(inner) => inner.as_str().to_string(),
        None => String::new(),
    }
}
