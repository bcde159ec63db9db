//! Integration tests for the full query analysis.

#[path = "../common/mod.rs"]
mod common;

use serde_json::json;
use sqlviz::analysis::{run_query, QueryError};
use sqlviz::lint::{ComplexityLevel, TipKind};

#[test]
fn test_report_contains_everything() {
    let db = common::demo_db();
    let report = run_query(
        &db.store,
        "SELECT name, salary FROM employees WHERE salary > 100000 ORDER BY salary DESC",
    )
    .unwrap();

    assert_eq!(report.results.columns, vec!["name", "salary"]);
    assert_eq!(
        report.results.rows,
        vec![
            vec![json!("Alice Johnson"), json!(125000)],
            vec![json!("Carol White"), json!(105000)],
        ]
    );
    assert_eq!(report.visualization.len(), 4);
    assert_eq!(report.tips.len(), 1);
    assert_eq!(report.tips[0].kind, TipKind::Performance);
    assert_eq!(report.complexity.score, 3);
    assert_eq!(report.complexity.level, ComplexityLevel::Intermediate);
}

#[test]
fn test_report_wire_shape() {
    let db = common::demo_db();
    let report = run_query(&db.store, "SELECT * FROM departments").unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["results"]["columns"][0], "id");
    assert_eq!(json["results"]["rows"].as_array().unwrap().len(), 5);
    assert_eq!(json["visualization"][0]["clause"], "FROM");
    assert_eq!(json["tips"][0]["type"], "best_practice");
    assert_eq!(json["complexity"]["level"], "Beginner");
}

#[test]
fn test_leading_comments_are_allowed() {
    let db = common::demo_db();
    let report = run_query(&db.store, "-- how many?\nSELECT COUNT(*) FROM projects").unwrap();
    assert_eq!(report.results.rows, vec![vec![json!(6)]]);
}

#[test]
fn test_rejects_writes() {
    let db = common::demo_db();
    let err = run_query(&db.store, "DELETE FROM employees").unwrap_err();
    assert!(matches!(err, QueryError::NotReadOnly));
    assert_eq!(
        err.user_message(),
        "Only SELECT queries are allowed. Please start your query with SELECT."
    );
}

#[test]
fn test_parse_error_message() {
    let db = common::demo_db();
    let err = run_query(&db.store, "SELECT name FROM employees WHERE").unwrap_err();
    assert!(matches!(err, QueryError::Parse(_)));
    let message = err.user_message();
    assert!(message.starts_with("SQL Syntax Error: "));
    assert!(message.ends_with(". Please check your query syntax."));
}

#[test]
fn test_missing_table_message() {
    let db = common::demo_db();
    let err = run_query(&db.store, "SELECT name FROM ghosts").unwrap_err();
    assert_eq!(
        err.user_message(),
        "Database Error: no such table: ghosts. The table does not exist in the database."
    );
}

#[test]
fn test_missing_column_message() {
    let db = common::demo_db();
    let err = run_query(&db.store, "SELECT nickname FROM employees").unwrap_err();
    assert_eq!(
        err.user_message(),
        "Database Error: no such column: nickname. The column does not exist in the table."
    );
}
