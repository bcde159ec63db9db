//! SQLite-backed [`DataStore`].

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use serde_json::{Number, Value};

use super::{ColumnInfo, DataStore, ExecutionError, QueryResult};

/// A SQLite database file opened read-only once per call.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create (or extend) the database at `path` by running `script`, then
    /// return a read-only store over it.
    pub fn create_from_script(
        path: impl Into<PathBuf>,
        script: &str,
    ) -> Result<Self, ExecutionError> {
        let path = path.into();
        let conn = Connection::open(&path)?;
        conn.execute_batch(script)?;
        Ok(Self { path })
    }

    fn connect(&self) -> Result<Connection, ExecutionError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(&self.path, flags)?)
    }
}

impl DataStore for SqliteStore {
    fn execute(&self, query: &str) -> Result<QueryResult, ExecutionError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(query)?;

        if !stmt.readonly() {
            return Err(ExecutionError::new(
                "attempt to write a readonly database",
            ));
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(to_json(row.get_ref(i)?));
            }
            rows.push(values);
        }

        Ok(QueryResult { columns, rows })
    }

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, ExecutionError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map(params![table], |row| {
                let pk: i64 = row.get(2)?;
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    data_type: row.get(1)?,
                    is_primary_key: pk > 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn table_names(&self) -> Result<Vec<String>, ExecutionError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(STANDARD.encode(bytes)),
    }
}
