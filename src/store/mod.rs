//! Query execution against a backing data store.
//!
//! The visualization engine only ever sees the [`DataStore`] trait; the
//! production implementation is [`SqliteStore`].

mod sqlite;

pub use sqlite::SqliteStore;

/// Script creating the bundled demo database (departments, employees,
/// projects).
pub const DEMO_SCRIPT: &str = include_str!("../../data/employees.sql");

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Columns and rows produced by one query execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Rows as column-name keyed maps in column order.
    ///
    /// When two columns share a name the later value wins.
    pub fn row_maps(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// One column of a table as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(rename = "pk")]
    pub is_primary_key: bool,
}

/// Coarse classification of an execution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionErrorKind {
    MissingTable,
    MissingColumn,
    Syntax,
    Generic,
}

/// A failure reported by the data store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Classify by the store's message text.
    pub fn kind(&self) -> ExecutionErrorKind {
        let lower = self.message.to_lowercase();
        if lower.contains("no such table") {
            ExecutionErrorKind::MissingTable
        } else if lower.contains("no such column") {
            ExecutionErrorKind::MissingColumn
        } else if lower.contains("syntax error") {
            ExecutionErrorKind::Syntax
        } else {
            ExecutionErrorKind::Generic
        }
    }
}

impl From<rusqlite::Error> for ExecutionError {
    fn from(err: rusqlite::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Something that can run read-only queries and describe its tables.
pub trait DataStore: Send + Sync {
    /// Execute `query` and return every row.
    fn execute(&self, query: &str) -> Result<QueryResult, ExecutionError>;

    /// Column descriptions of `table`, in declaration order.
    fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, ExecutionError>;

    /// Names of user tables.
    fn table_names(&self) -> Result<Vec<String>, ExecutionError>;

    /// Every user table with its columns.
    fn schema(&self) -> Result<BTreeMap<String, Vec<ColumnInfo>>, ExecutionError> {
        self.table_names()?
            .into_iter()
            .map(|table| {
                let columns = self.table_columns(&table)?;
                Ok((table, columns))
            })
            .collect()
    }
}
