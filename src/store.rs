// used for the paraphrase table
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Statement};
use tracing::debug;

use crate::compile::{CompiledQuery, Mode, TABLE};
use crate::error::{ParaqueryError, Result};
use crate::normalize::SamePos;
use crate::relation::Relation;

/// File name of a paraphrase database inside its directory.
pub const DATABASE_FILE: &str = ".paradb";

#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    pub text: String,
    pub score: String,
}

/// A paraphrase rule as it is put into the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub source: String,
    pub target: String,
    /// Probability of the target given the source; stored as `-ln(p)`.
    pub probability: f64,
    pub pivots: Vec<Pivot>,
    pub relation: Relation,
    pub distance: i64,
    pub same_pos: SamePos,
    pub duplicate_target: bool,
}

impl Rule {
    pub fn new(source: &str, target: &str, probability: f64) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            probability,
            pivots: Vec::new(),
            relation: Relation::NotInTaxonomy,
            distance: -1,
            same_pos: SamePos::Unknown,
            duplicate_target: false,
        }
    }
    pub fn with_pivots(mut self, pivots: &[(&str, &str)]) -> Self {
        self.pivots = pivots
            .iter()
            .map(|(text, score)| Pivot { text: text.to_string(), score: score.to_string() })
            .collect();
        self
    }
    pub fn with_relation(mut self, relation: Relation, distance: i64) -> Self {
        self.relation = relation;
        self.distance = distance;
        self
    }
    pub fn with_same_pos(mut self, same_pos: SamePos) -> Self {
        self.same_pos = same_pos;
        self
    }
    pub fn with_duplicate_target(mut self, duplicate: bool) -> Self {
        self.duplicate_target = duplicate;
        self
    }
}

/// One rule as returned by a row query.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRow {
    pub source: String,
    pub target: String,
    pub cost: f64,
    pub relation: i64,
    pub pivot_count: i64,
    pub pivots: Vec<Pivot>,
    pub distance: i64,
}

impl RuleRow {
    pub fn probability(&self) -> f64 {
        (-self.cost).exp()
    }
}

/// One group as returned by a count query; `group` is `None` when ungrouped.
#[derive(Debug, Clone, PartialEq)]
pub struct CountRow {
    pub group: Option<Value>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Rules(Vec<RuleRow>),
    Counts(Vec<CountRow>),
}

impl QueryResult {
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Rules(rows) => rows.len(),
            QueryResult::Counts(rows) => rows.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn word_count(phrase: &str) -> i64 {
    phrase.split_whitespace().count() as i64
}

/// Pivots are kept as a JSON array of `"text:score"` entries.
pub fn encode_pivots(pivots: &[Pivot]) -> Result<String> {
    let entries: Vec<String> = pivots.iter().map(|p| format!("{}:{}", p.text, p.score)).collect();
    Ok(serde_json::to_string(&entries)?)
}

pub fn decode_pivots(stored: &str) -> Result<Vec<Pivot>> {
    let stored = stored.trim();
    if stored.is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<String> = serde_json::from_str(stored)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry.rsplit_once(':') {
            Some((text, score)) => Pivot { text: text.to_string(), score: score.to_string() },
            None => Pivot { text: entry, score: String::new() },
        })
        .collect())
}

// ------------- Store -------------
pub struct Store<'db> {
    pub db: &'db Connection,
    pub add_rule: Statement<'db>,
    pub count_rules: Statement<'db>,
}
impl<'db> Store<'db> {
    pub fn new(connection: &'db Connection) -> Result<Store<'db>> {
        connection.execute_batch(
            "
            create table if not exists paraphrase (
                source text,
                target text,
                identity integer,
                srclen integer,
                tgtlen integer,
                lendiff integer,
                pe2e1 real,
                pivotnum integer,
                pivots text,
                relation integer,
                distance integer,
                samepos integer,
                tgtdupl integer
            );
            create index if not exists srcidx on paraphrase(source);
            create index if not exists tgtidx on paraphrase(target);
            create index if not exists identidx on paraphrase(identity);
            create index if not exists srclenidx on paraphrase(srclen);
            create index if not exists tgtlenidx on paraphrase(tgtlen);
            create index if not exists lendiffidx on paraphrase(lendiff);
            create index if not exists probidx on paraphrase(pe2e1);
            create index if not exists relidx on paraphrase(relation);
            create index if not exists pivotnumidx on paraphrase(pivotnum);
            create index if not exists pivotidx on paraphrase(pivots);
            create index if not exists distidx on paraphrase(distance);
            create index if not exists sameposidx on paraphrase(samepos);
            create index if not exists tgtduplidx on paraphrase(tgtdupl);
            ",
        )?;
        Ok(Store {
            db: connection,
            add_rule: connection.prepare(
                "
                insert into paraphrase (
                    source, target, identity, srclen, tgtlen, lendiff, pe2e1,
                    pivotnum, pivots, relation, distance, samepos, tgtdupl
                ) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            )?,
            count_rules: connection.prepare(
                "
                select count(*)
                    from paraphrase
            ",
            )?,
        })
    }

    pub fn insert(&mut self, rule: &Rule) -> Result<()> {
        let srclen = word_count(&rule.source);
        let tgtlen = word_count(&rule.target);
        self.add_rule.execute(params![
            &rule.source,
            &rule.target,
            rule.source == rule.target,
            srclen,
            tgtlen,
            tgtlen - srclen,
            -rule.probability.ln(),
            rule.pivots.len() as i64,
            encode_pivots(&rule.pivots)?,
            i64::from(rule.relation.id()),
            rule.distance,
            rule.same_pos.code(),
            rule.duplicate_target,
        ])?;
        Ok(())
    }

    pub fn record_count(&mut self) -> Result<i64> {
        Ok(self.count_rules.query_row([], |r| r.get(0))?)
    }

    pub fn execute(&self, query: &CompiledQuery) -> Result<QueryResult> {
        let (sql, params) = query.to_sql();
        debug!(%sql, params = params.len(), "executing against {}", TABLE);
        let mut statement = self
            .db
            .prepare(&sql)
            .map_err(|e| ParaqueryError::Execution(e.to_string()))?;
        let mut rows = statement
            .query(params_from_iter(params.iter()))
            .map_err(|e| ParaqueryError::Execution(e.to_string()))?;
        match query.mode {
            Mode::Row => {
                let mut rules = Vec::new();
                while let Some(row) = rows.next()? {
                    let pivots: Option<String> = row.get(5)?;
                    rules.push(RuleRow {
                        source: row.get(0)?,
                        target: row.get(1)?,
                        cost: row.get(2)?,
                        relation: row.get::<_, Option<i64>>(3)?.unwrap_or(-1),
                        pivot_count: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
                        pivots: decode_pivots(pivots.as_deref().unwrap_or(""))?,
                        distance: row.get::<_, Option<i64>>(6)?.unwrap_or(-1),
                    });
                }
                Ok(QueryResult::Rules(rules))
            }
            Mode::Count => {
                let mut counts = Vec::new();
                while let Some(row) = rows.next()? {
                    let group = match (query.group_by, row.get::<_, Value>(0)?) {
                        (None, _) => None,
                        (Some(_), value) => Some(value),
                    };
                    counts.push(CountRow { group, count: row.get(1)? });
                }
                Ok(QueryResult::Counts(counts))
            }
        }
    }
}
