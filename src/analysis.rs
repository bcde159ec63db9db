//! The full analysis of one learner query.
//!
//! ```text
//! text ─▶ is_read_only ─▶ parse ─▶ generate_steps ─▶ execute ─▶ tips ─▶ complexity
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::lint::{analyze_query, complexity_score, Complexity, Tip};
use crate::query::{is_read_only, ParseError, ParsedQuery};
use crate::store::{DataStore, ExecutionError, ExecutionErrorKind, QueryResult};
use crate::visualize::{generate_steps_for, VisualizationStep};

/// Everything returned for a successfully analyzed query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub results: QueryResult,
    pub visualization: Vec<VisualizationStep>,
    pub tips: Vec<Tip>,
    pub complexity: Complexity,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("only SELECT queries are allowed")]
    NotReadOnly,

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),
}

impl QueryError {
    /// Message shown to the learner.
    pub fn user_message(&self) -> String {
        match self {
            QueryError::NotReadOnly => {
                "Only SELECT queries are allowed. Please start your query with SELECT.".to_string()
            }
            QueryError::Parse(err) => {
                format!("SQL Syntax Error: {}. Please check your query syntax.", err)
            }
            QueryError::Execution(err) => match err.kind() {
                ExecutionErrorKind::MissingTable => format!(
                    "Database Error: {}. The table does not exist in the database.",
                    err
                ),
                ExecutionErrorKind::MissingColumn => format!(
                    "Database Error: {}. The column does not exist in the table.",
                    err
                ),
                ExecutionErrorKind::Syntax => {
                    format!("SQL Syntax Error: {}. Please check your query syntax.", err)
                }
                ExecutionErrorKind::Generic => format!("Database Error: {}", err),
            },
        }
    }
}

/// Validate, visualize and execute `text`, then lint it.
pub fn run_query(store: &dyn DataStore, text: &str) -> Result<QueryReport, QueryError> {
    let text = text.trim();
    if !is_read_only(text) {
        return Err(QueryError::NotReadOnly);
    }

    let parsed = ParsedQuery::parse(text)?;
    let visualization = generate_steps_for(store, &parsed);
    let results = store.execute(text)?;
    debug!(
        steps = visualization.len(),
        rows = results.row_count(),
        "analysis.query_complete"
    );

    Ok(QueryReport {
        results,
        visualization,
        tips: analyze_query(text),
        complexity: complexity_score(text),
    })
}
