//! Walks the canonical clause order and executes one truncated query per
//! present clause.

use thiserror::Error;
use tracing::{debug, warn};

use crate::query::{build_truncated, extract, BuildError, ClauseKind, ParsedQuery, QueryStructure};
use crate::store::{DataStore, ExecutionError, QueryResult};

use super::{format, VisualizationStep};

/// Why a single clause produced no step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Execute(#[from] ExecutionError),
}

/// Produce the visualization steps for `text`.
///
/// Unparseable text degrades to a single whole-query step; if even that
/// cannot be executed the result is empty.
pub fn generate_steps(store: &dyn DataStore, text: &str) -> Vec<VisualizationStep> {
    match ParsedQuery::parse(text) {
        Ok(parsed) => generate_steps_for(store, &parsed),
        Err(err) => {
            warn!(error = %err, "visualize.parse_failed");
            fallback(store, text)
        }
    }
}

/// Produce the visualization steps for an already parsed query.
pub fn generate_steps_for(store: &dyn DataStore, parsed: &ParsedQuery) -> Vec<VisualizationStep> {
    let structure = extract(parsed);
    let mut steps = Vec::new();

    for clause in structure.present_clauses() {
        match run_clause(store, parsed.text(), &structure, clause) {
            Ok(result) => {
                let number = steps.len() + 1;
                steps.push(format::clause_step(number, clause, &structure, &result));
            }
            Err(err) => warn!(%clause, error = %err, "visualize.step_skipped"),
        }
    }

    steps
}

fn run_clause(
    store: &dyn DataStore,
    text: &str,
    structure: &QueryStructure,
    clause: ClauseKind,
) -> Result<QueryResult, StepError> {
    let query = step_query(text, structure, clause)?;
    debug!(%clause, query = %query, "visualize.step_query");
    Ok(store.execute(&query)?)
}

/// The query whose rows illustrate `clause`.
///
/// SELECT has no boundary of its own: it reuses the most specific clause
/// before it, and runs the original text when there is none.
fn step_query(
    text: &str,
    structure: &QueryStructure,
    clause: ClauseKind,
) -> Result<String, BuildError> {
    let boundary = match clause {
        ClauseKind::Select => match structure.last_clause_before_select() {
            Some(boundary) => boundary,
            None => return Ok(text.to_string()),
        },
        other => other,
    };
    build_truncated(text, boundary)
}

fn fallback(store: &dyn DataStore, text: &str) -> Vec<VisualizationStep> {
    match store.execute(text) {
        Ok(result) => vec![format::fallback_step(&result)],
        Err(err) => {
            warn!(error = %err, "visualize.fallback_failed");
            Vec::new()
        }
    }
}
