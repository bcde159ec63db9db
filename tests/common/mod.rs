//! Shared fixtures: throwaway SQLite databases seeded with demo data.

#![allow(dead_code)]

use std::path::PathBuf;

use sqlviz::store::{SqliteStore, DEMO_SCRIPT};
use tempfile::TempDir;

/// A seeded database that lives as long as the fixture.
pub struct Fixture {
    pub dir: TempDir,
    pub store: SqliteStore,
}

impl Fixture {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// The bundled employees database.
pub fn demo_db() -> Fixture {
    db_from_script(DEMO_SCRIPT)
}

pub fn db_from_script(script: &str) -> Fixture {
    let dir = TempDir::new().expect("create temp dir");
    let store = SqliteStore::create_from_script(dir.path().join("test.db"), script)
        .expect("seed database");
    Fixture { dir, store }
}

/// A miniature detective-case database.
pub const CASE_SCRIPT: &str = "
CREATE TABLE employees (employee_id INTEGER PRIMARY KEY, name TEXT, role TEXT);
CREATE TABLE access_logs (id INTEGER PRIMARY KEY, employee_id INTEGER, timestamp TEXT, action TEXT);
INSERT INTO employees VALUES (202, 'Marcus Vale', 'Archivist'), (305, 'Nina Park', 'Engineer');
INSERT INTO access_logs VALUES
    (1, 202, '2024-03-01 21:04', 'LOGIN'),
    (2, 202, '2024-03-01 21:10', 'DELETED'),
    (3, 305, '2024-03-01 09:00', 'LOGIN');
";
