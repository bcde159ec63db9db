//! Parsing query text into a typed AST.

use sqlparser::ast::{Query, Select, SetExpr, Statement};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use thiserror::Error;

/// Errors produced while parsing query text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(String),

    #[error("expected exactly one statement, found {0}")]
    StatementCount(usize),

    #[error("statement is not a SELECT query")]
    NotAQuery,
}

/// A single read query together with the text it was parsed from.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    text: String,
    query: Box<Query>,
}

impl ParsedQuery {
    /// Parse `text` as exactly one SELECT statement (SQLite dialect).
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let statements = Parser::parse_sql(&SQLiteDialect {}, text)
            .map_err(|e| ParseError::Syntax(e.to_string()))?;

        if statements.len() != 1 {
            return Err(ParseError::StatementCount(statements.len()));
        }

        match statements.into_iter().next() {
            Some(Statement::Query(query)) => Ok(Self {
                text: text.to_string(),
                query,
            }),
            _ => Err(ParseError::NotAQuery),
        }
    }

    /// The original query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The parsed query tree.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The top-level SELECT, if the body is a plain (possibly parenthesized)
    /// SELECT rather than a set operation or VALUES list.
    pub fn select(&self) -> Option<&Select> {
        primary_select(&self.query.body)
    }

    pub(crate) fn into_query(self) -> Box<Query> {
        self.query
    }
}

pub(crate) fn primary_select(body: &SetExpr) -> Option<&Select> {
    match body {
        SetExpr::Select(select) => Some(select),
        SetExpr::Query(inner) => primary_select(&inner.body),
        _ => None,
    }
}

pub(crate) fn primary_select_mut(body: &mut SetExpr) -> Option<&mut Select> {
    match body {
        SetExpr::Select(select) => Some(select),
        SetExpr::Query(inner) => primary_select_mut(&mut inner.body),
        _ => None,
    }
}

/// Drop leading `--` line comments and surrounding whitespace.
pub fn strip_leading_comments(text: &str) -> &str {
    let mut rest = text;
    while rest.trim_start().starts_with("--") {
        rest = match rest.split_once('\n') {
            Some((_, tail)) => tail,
            None => "",
        };
    }
    rest.trim()
}

/// Whether `text` is an allowed read-only query: once leading line comments
/// are stripped it must start with `SELECT`, in any case.
pub fn is_read_only(text: &str) -> bool {
    strip_leading_comments(text)
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}
