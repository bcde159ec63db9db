//! Integration tests for clause truncation: every truncated form must be a
//! standalone query SQLite can run.

#[path = "../common/mod.rs"]
mod common;

use sqlviz::query::{build_truncated, extract, ClauseKind, ParsedQuery};
use sqlviz::store::DataStore;

const QUERIES: &[&str] = &[
    "SELECT name FROM employees",
    "SELECT name, salary FROM employees WHERE salary > 80000 ORDER BY salary DESC LIMIT 3",
    "SELECT e.name, d.name AS dept FROM employees e \
     LEFT JOIN departments d ON e.department_id = d.id WHERE d.location = 'London'",
    "SELECT department_id, COUNT(*) AS n, MAX(salary) FROM employees \
     GROUP BY department_id HAVING COUNT(*) > 1 ORDER BY n DESC",
    "SELECT p.name FROM projects p JOIN employees e USING (department_id)",
    "SELECT name FROM employees WHERE department_id IN \
     (SELECT id FROM departments WHERE budget > 500000)",
    "SELECT * FROM (SELECT name, salary FROM employees) AS sub WHERE salary < 60000",
];

#[test]
fn test_every_present_boundary_executes() {
    let db = common::demo_db();

    for query in QUERIES {
        let structure = extract(&ParsedQuery::parse(query).unwrap());
        for clause in structure.present_clauses() {
            let truncated = build_truncated(query, clause)
                .unwrap_or_else(|e| panic!("{clause} of {query:?}: {e}"));
            let result = db.store.execute(&truncated);
            assert!(
                result.is_ok(),
                "{clause} of {query:?} produced {truncated:?}: {:?}",
                result
            );
        }
    }
}

#[test]
fn test_truncation_is_stable_under_reparse() {
    for query in QUERIES {
        for clause in [ClauseKind::Join, ClauseKind::Where, ClauseKind::GroupBy] {
            let once = build_truncated(query, clause).unwrap();
            let twice = build_truncated(&once, clause).unwrap();
            assert_eq!(once, twice, "{clause} of {query:?}");
        }
    }
}

#[test]
fn test_where_boundary_filters_but_does_not_sort() {
    let db = common::demo_db();
    let query = QUERIES[1];
    let truncated = build_truncated(query, ClauseKind::Where).unwrap();

    assert!(!truncated.contains("ORDER BY"));
    assert!(truncated.contains("LIMIT 3"));
    assert_eq!(db.store.execute(&truncated).unwrap().row_count(), 3);
}

#[test]
fn test_derived_table_drives_from_inner_table() {
    let structure = extract(&ParsedQuery::parse(QUERIES[6]).unwrap());
    assert_eq!(structure.driving_table(), Some("employees"));
    assert_eq!(
        build_truncated(QUERIES[6], ClauseKind::From).unwrap(),
        "SELECT * FROM employees"
    );
}

#[test]
fn test_using_join_condition() {
    let structure = extract(&ParsedQuery::parse(QUERIES[4]).unwrap());
    assert_eq!(structure.joins.len(), 1);
    assert_eq!(
        structure.joins[0].condition.as_deref(),
        Some("USING (department_id)")
    );
}
