//! Rebuilding a query with every clause after a boundary removed.

use std::sync::LazyLock;

use regex::Regex;
use sqlparser::ast::GroupByExpr;
use thiserror::Error;

use super::clause::ClauseKind;
use super::extract::extract;
use super::parse::{primary_select_mut, ParseError, ParsedQuery};

static BARE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Errors produced while building a truncated query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("failed to re-parse query: {0}")]
    Parse(#[from] ParseError),

    #[error("query has no driving table")]
    NoDrivingTable,

    #[error("cannot truncate {0}")]
    Unsupported(&'static str),
}

/// Build the query text that stops at `boundary`.
///
/// * `From` yields `SELECT * FROM <driving table>`, behind the query's
///   `WITH` clause when it has one.
/// * `Join`, `Where`, `GroupBy`, `Having` and `Select` drop every later
///   top-level clause among WHERE, GROUP BY, HAVING and ORDER BY.
///   LIMIT and OFFSET are kept.
/// * `OrderBy` returns `original` unchanged.
pub fn build_truncated(original: &str, boundary: ClauseKind) -> Result<String, BuildError> {
    match boundary {
        ClauseKind::From => {
            let parsed = ParsedQuery::parse(original)?;
            let structure = extract(&parsed);
            let table = structure
                .driving_table()
                .ok_or(BuildError::NoDrivingTable)?;
            // the driving table may be a CTE, which only exists under its WITH
            match &parsed.query().with {
                Some(with) => Ok(format!("{} SELECT * FROM {}", with, quote_identifier(table))),
                None => Ok(format!("SELECT * FROM {}", quote_identifier(table))),
            }
        }
        ClauseKind::OrderBy => Ok(original.to_string()),
        _ => strip_after(original, boundary),
    }
}

fn strip_after(original: &str, boundary: ClauseKind) -> Result<String, BuildError> {
    let mut query = ParsedQuery::parse(original)?.into_query();

    {
        let select = primary_select_mut(&mut query.body)
            .ok_or(BuildError::Unsupported("set operations"))?;

        for clause in boundary.following() {
            match clause {
                ClauseKind::Where => select.selection = None,
                ClauseKind::GroupBy => {
                    select.group_by = GroupByExpr::Expressions(Vec::new(), Vec::new())
                }
                ClauseKind::Having => select.having = None,
                _ => {}
            }
        }
    }

    if boundary < ClauseKind::OrderBy {
        query.order_by = None;
    }

    Ok(query.to_string())
}

/// Quote `name` unless it is a bare identifier.
fn quote_identifier(name: &str) -> String {
    if BARE_IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
