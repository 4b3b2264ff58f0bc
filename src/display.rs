//! Rendering query results for the shell.

use std::cmp::Ordering;

use rusqlite::types::Value;

use crate::normalize::{Field, SamePos};
use crate::relation::{relation_name, Relation};
use crate::store::{CountRow, QueryResult, RuleRow};

// both sides wider than this switch to the two-line layout
const WIDE_PHRASE: usize = 25;

pub fn format_probability(p: f64) -> String {
    if p < 0.0001 {
        format!("{p:>6.3e}")
    } else {
        format!("{p:.4}")
    }
}

/// Relation label shown next to a rule; undefined relations show the WordNet distance instead.
pub fn relation_label(relation: i64, distance: i64) -> String {
    if relation == i64::from(Relation::Undefined.id()) {
        if distance >= 0 {
            format!("WN distance={distance}")
        } else {
            "not connected in WN".to_string()
        }
    } else {
        relation_name(relation).to_string()
    }
}

fn pivot_lines(row: &RuleRow) -> String {
    row.pivots
        .iter()
        .enumerate()
        .map(|(i, p)| format!("\n    {}.  {} : {}", i + 1, p.text, p.score))
        .collect()
}

fn pivot_entries(row: &RuleRow) -> String {
    row.pivots
        .iter()
        .map(|p| format!("{}:{}", p.text, p.score))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Aligned listing for interactive use, tab separated lines otherwise.
pub fn format_rules(rows: &[RuleRow], interactive: bool, explain: bool) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let cells: Vec<(String, String)> = rows
        .iter()
        .map(|r| (format_probability(r.probability()), relation_label(r.relation, r.distance)))
        .collect();
    if !interactive {
        let lines: Vec<String> = rows
            .iter()
            .zip(&cells)
            .map(|(row, (prob, rel))| {
                if explain {
                    format!("{}\t{}\t{}\t{}\t{}", row.source, row.target, prob, rel, pivot_entries(row))
                } else {
                    format!("{}\t{}\t{}\t{}", row.source, row.target, prob, rel)
                }
            })
            .collect();
        return lines.join("\n");
    }
    let src_width = rows.iter().map(|r| r.source.chars().count()).max().unwrap_or(0);
    let tgt_width = rows.iter().map(|r| r.target.chars().count()).max().unwrap_or(0);
    let prob_width = cells.iter().map(|(p, _)| p.chars().count()).max().unwrap_or(0);
    let rel_width = cells.iter().map(|(_, r)| r.chars().count()).max().unwrap_or(0);
    let too_wide = src_width > WIDE_PHRASE && tgt_width > WIDE_PHRASE;

    let mut out = vec![String::new()];
    for (row, (prob, rel)) in rows.iter().zip(&cells) {
        let pivots = if explain { pivot_lines(row) } else { String::new() };
        if too_wide {
            out.push(format!(
                "\n  {} =>\n  {}\n  [{:>pw$}]  {:<rw$}  {}",
                row.source,
                row.target,
                prob,
                rel,
                pivots,
                pw = prob_width,
                rw = rel_width
            ));
        } else if explain {
            out.push(format!(
                "  {:>sw$} => {:<tw$} [{}] {} {}\n",
                row.source,
                row.target,
                prob,
                rel,
                pivots,
                sw = src_width,
                tw = tgt_width
            ));
        } else {
            out.push(format!(
                "  {:>sw$} => {:<tw$} [{:>pw$}] {:<rw$}",
                row.source,
                row.target,
                prob,
                rel,
                sw = src_width,
                tw = tgt_width,
                pw = prob_width,
                rw = rel_width
            ));
        }
    }
    out.push(String::new());
    out.join("\n")
}

fn group_label(group: &Value, field: Option<Field>) -> String {
    match (field, group) {
        (Some(Field::Relation), Value::Integer(id)) => relation_name(*id).to_string(),
        (Some(Field::SamePos), Value::Integer(code)) => SamePos::from_code(*code).label().to_string(),
        (_, Value::Null) => String::new(),
        (_, Value::Integer(i)) => i.to_string(),
        (_, Value::Real(r)) => r.to_string(),
        (_, Value::Text(t)) => t.clone(),
        (_, Value::Blob(b)) => format!("<{} bytes>", b.len()),
    }
}

// nulls first, then numbers by value, then text, then blobs
fn group_order(a: &Value, b: &Value) -> Ordering {
    fn class(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Integer(_) | Value::Real(_) => 1,
            Value::Text(_) => 2,
            Value::Blob(_) => 3,
        }
    }
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Integer(x), Value::Real(y)) => (*x as f64).total_cmp(y),
        (Value::Real(x), Value::Integer(y)) => x.total_cmp(&(*y as f64)),
        (Value::Real(x), Value::Real(y)) => x.total_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Blob(x), Value::Blob(y)) => x.cmp(y),
        _ => class(a).cmp(&class(b)),
    }
}

/// One `group<TAB>count` line per group in group key order, or just the count when ungrouped.
pub fn format_counts(rows: &[CountRow], group_by: Option<Field>) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut sorted: Vec<&CountRow> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        let by_group = match (&a.group, &b.group) {
            (Some(x), Some(y)) => group_order(x, y),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
        };
        by_group.then(a.count.cmp(&b.count))
    });
    let labelled: Vec<(String, i64)> = sorted
        .into_iter()
        .map(|r| (r.group.as_ref().map(|g| group_label(g, group_by)).unwrap_or_default(), r.count))
        .collect();
    let group_width = labelled.iter().map(|(g, _)| g.chars().count()).max().unwrap_or(0);
    let mut out = vec![String::new()];
    for (group, count) in labelled {
        if group.is_empty() {
            out.push(count.to_string());
        } else {
            out.push(format!("{group:>group_width$}\t{count}"));
        }
    }
    out.push(String::new());
    out.join("\n")
}

/// Unformatted result lines as returned by `get`: every column tab separated.
pub fn format_raw(result: &QueryResult) -> String {
    match result {
        QueryResult::Rules(rows) => rows
            .iter()
            .map(|r| {
                format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    r.source,
                    r.target,
                    r.cost,
                    r.relation,
                    r.pivot_count,
                    pivot_entries(r),
                    r.distance
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        QueryResult::Counts(rows) => rows
            .iter()
            .map(|r| match &r.group {
                Some(group) => format!("{}\t{}", group_label(group, None), r.count),
                None => r.count.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
