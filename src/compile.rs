//! Compiling parsed queries into executable queries over the paraphrase table.
//!
//! [`compile`] is a pure function of the parsed query and the session
//! settings. The resulting [`CompiledQuery`] renders to SQL twice over: with
//! `?` placeholders and bind parameters for execution, and through `Display`
//! with inlined literals for debugging.

use std::fmt;

use tracing::{debug, warn};

use crate::error::Result;
use crate::normalize::{normalize, Field, Literal, Operator, Predicate, SamePos, Term, UnresolvedPredicate};
use crate::parser::{parse_query, Comparison, ParsedQuery, QueryBody, Rank, UnaryDirective};
use crate::session::{OrderMode, Settings};

pub const TABLE: &str = "paraphrase";

/// Columns returned for each rule in row mode, in this order.
pub const ROW_COLUMNS: [Field; 7] = [
    Field::Source,
    Field::Target,
    Field::Cost,
    Field::Relation,
    Field::PivotCount,
    Field::Pivots,
    Field::Distance,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Row,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn sql(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Field(Field, Direction),
    Random,
    CountAscending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub mode: Mode,
    /// AND-composed.
    pub predicates: Vec<Predicate>,
    pub group_by: Option<Field>,
    pub order_by: OrderBy,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub query: CompiledQuery,
    pub warnings: Vec<UnresolvedPredicate>,
}

/// Parses and compiles one query line under the given settings.
pub fn compile_text(text: &str, settings: &Settings) -> Result<Compilation> {
    let parsed = parse_query(text)?;
    let compilation = compile(&parsed, settings);
    if settings.debug {
        debug!(query = text, sql = %compilation.query, "compiled");
    }
    Ok(compilation)
}

pub fn compile(parsed: &ParsedQuery, settings: &Settings) -> Compilation {
    let mode = if parsed.count { Mode::Count } else { Mode::Row };
    let mut warnings = Vec::new();
    let (predicates, order) = match &parsed.body {
        QueryBody::Directive(UnaryDirective::Identity(same)) => {
            let identity = Term::compare(Field::Identity, Comparison::Eq, Literal::Bool(*same));
            (vec![identity.into()], OrderBy::Random)
        }
        QueryBody::Directive(UnaryDirective::Probable(rank)) => {
            let direction = match rank {
                Rank::Most => Direction::Ascending,
                Rank::Least => Direction::Descending,
            };
            (with_defaults(Vec::new(), settings), OrderBy::Field(Field::Cost, direction))
        }
        QueryBody::Conditions(conditions) => {
            let mut predicates = Vec::with_capacity(conditions.len() + 3);
            for condition in conditions {
                match normalize(condition) {
                    Ok(predicate) => predicates.push(predicate),
                    Err(unresolved) => {
                        warn!(%unresolved, "dropping condition");
                        warnings.push(unresolved);
                    }
                }
            }
            (with_defaults(predicates, settings), session_order(settings.order))
        }
    };
    let query = match mode {
        Mode::Row => CompiledQuery { mode, predicates, group_by: None, order_by: order, limit: settings.limit },
        Mode::Count => CompiledQuery {
            mode,
            predicates,
            group_by: settings.group_by,
            order_by: OrderBy::CountAscending,
            limit: None,
        },
    };
    Compilation { query, warnings }
}

fn with_defaults(mut predicates: Vec<Predicate>, settings: &Settings) -> Vec<Predicate> {
    let identity_given = predicates.iter().any(Predicate::constrains_identity);
    if !identity_given && !settings.include_identity {
        predicates.push(Term::compare(Field::Identity, Comparison::Eq, Literal::Bool(false)).into());
    }
    if settings.same_pos_only {
        predicates.push(Term::compare(Field::SamePos, Comparison::Eq, Literal::Int(SamePos::Same.code())).into());
    }
    if settings.unique_target_only {
        predicates.push(Term::compare(Field::TargetDuplicate, Comparison::Eq, Literal::Bool(false)).into());
    }
    predicates
}

fn session_order(order: OrderMode) -> OrderBy {
    match order {
        OrderMode::HighestFirst => OrderBy::Field(Field::Cost, Direction::Ascending),
        OrderMode::LowestFirst => OrderBy::Field(Field::Cost, Direction::Descending),
        OrderMode::Random => OrderBy::Random,
    }
}

impl CompiledQuery {
    /// SQL with `?` placeholders and the parameters to bind, in order.
    pub fn to_sql(&self) -> (String, Vec<Literal>) {
        let mut params = Vec::new();
        let sql = self.render(&mut |literal, out| {
            params.push(literal.clone());
            out.push('?');
        });
        (sql, params)
    }

    fn render(&self, bind: &mut dyn FnMut(&Literal, &mut String)) -> String {
        let mut sql = String::from("select ");
        match self.mode {
            Mode::Row => {
                let columns: Vec<&str> = ROW_COLUMNS.iter().map(|f| f.column()).collect();
                sql.push_str(&columns.join(", "));
            }
            Mode::Count => {
                match self.group_by {
                    Some(field) => sql.push_str(field.column()),
                    None => sql.push_str("null"),
                }
                sql.push_str(", count(*) as cnt");
            }
        }
        sql.push_str(" from ");
        sql.push_str(TABLE);
        for (i, predicate) in self.predicates.iter().enumerate() {
            sql.push_str(if i == 0 { " where " } else { " and " });
            match predicate {
                Predicate::Term(term) => render_term(term, &mut sql, bind),
                Predicate::AnyOf(terms) => {
                    sql.push('(');
                    for (j, term) in terms.iter().enumerate() {
                        if j > 0 {
                            sql.push_str(" or ");
                        }
                        render_term(term, &mut sql, bind);
                    }
                    sql.push(')');
                }
            }
        }
        if let Some(field) = self.group_by {
            sql.push_str(" group by ");
            sql.push_str(field.column());
        }
        match self.order_by {
            OrderBy::Field(field, direction) => {
                sql.push_str(&format!(" order by {} {}", field.column(), direction.sql()));
            }
            OrderBy::Random => sql.push_str(" order by random()"),
            OrderBy::CountAscending => sql.push_str(" order by cnt asc"),
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" limit {limit}"));
        }
        sql
    }
}

fn render_term(term: &Term, sql: &mut String, bind: &mut dyn FnMut(&Literal, &mut String)) {
    sql.push_str(term.field.column());
    sql.push(' ');
    sql.push_str(term.op.sql());
    sql.push(' ');
    bind(&term.value, sql);
    if term.op == Operator::Like {
        sql.push_str(" escape '\\'");
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sql = self.render(&mut |literal, out| out.push_str(&literal.to_string()));
        write!(f, "{sql}")
    }
}
