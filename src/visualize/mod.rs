//! Step-by-step visualization of a query.
//!
//! Each present clause is turned into one [`VisualizationStep`] holding the
//! rows the query produces when truncated at that clause:
//!
//! ```text
//! ParsedQuery
//!     │ extract
//!     ▼
//! QueryStructure ──present_clauses()──▶ FROM, JOIN, WHERE, ... ORDER BY
//!                                          │
//!                         build_truncated  │  DataStore::execute
//!                                          ▼
//!                               Vec<VisualizationStep>
//! ```
//!
//! A clause whose truncated query cannot be built or executed is skipped.
//! Generation itself never fails.

mod format;
mod sequencer;

pub use sequencer::{generate_steps, generate_steps_for, StepError};

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::query::ClauseKind;

/// What a step visualizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Clause(ClauseKind),
    /// Whole-query results, used when the query could not be decomposed.
    Result,
}

impl StepKind {
    pub fn label(self) -> &'static str {
        match self {
            StepKind::Clause(clause) => clause.label(),
            StepKind::Result => "RESULT",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for StepKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl From<ClauseKind> for StepKind {
    fn from(clause: ClauseKind) -> Self {
        StepKind::Clause(clause)
    }
}

/// One rendered step of the visualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationStep {
    pub title: String,
    pub description: String,
    #[serde(rename = "data")]
    pub rows: Vec<Map<String, Value>>,
    pub clause: StepKind,
}
