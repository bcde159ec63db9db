//! Integration tests for lesson validation and the detective case.

#[path = "../common/mod.rs"]
mod common;

use std::fs;

use serde_json::json;
use sqlviz::case::{solve_stage, CaseFile};
use sqlviz::content::ContentError;
use sqlviz::lessons::{validate_lesson, Curriculum};

fn write_curriculum(fixture: &common::Fixture) -> Curriculum {
    let path = fixture.path("curriculum.json");
    fs::write(
        &path,
        json!({
            "modules": [{
                "title": "Filtering",
                "lessons": [{
                    "id": "where-1",
                    "title": "Well paid engineers",
                    "solution_query": "SELECT name FROM employees WHERE department_id = 1 AND salary > 100000"
                }]
            }]
        })
        .to_string(),
    )
    .unwrap();
    Curriculum::load(&path).unwrap()
}

// ============================================================================
// Lessons
// ============================================================================

#[test]
fn test_correct_answer_in_any_order() {
    let db = common::demo_db();
    let curriculum = write_curriculum(&db);
    let lesson = curriculum.lesson("where-1").unwrap();

    let verdict = validate_lesson(
        &db.store,
        lesson,
        "SELECT name FROM employees WHERE salary > 100000 AND department_id = 1 ORDER BY name DESC",
    );
    assert!(verdict.is_correct, "{}", verdict.feedback);
    assert_eq!(
        verdict.feedback,
        "🎉 Correct! Well done! You can move on to the next lesson."
    );
    assert_eq!(verdict.user_row_count, Some(2));
}

#[test]
fn test_wrong_rows() {
    let db = common::demo_db();
    let curriculum = write_curriculum(&db);
    let lesson = curriculum.lesson("where-1").unwrap();

    let verdict = validate_lesson(
        &db.store,
        lesson,
        "SELECT name FROM employees WHERE department_id = 1",
    );
    assert!(!verdict.is_correct);
    assert_eq!(
        verdict.feedback,
        "The results don't match the expected output. You got 4 rows, expected 2 rows. \
         Check your WHERE, JOIN, or GROUP BY clauses."
    );
}

#[test]
fn test_lesson_rejects_writes_and_bad_sql() {
    let db = common::demo_db();
    let curriculum = write_curriculum(&db);
    let lesson = curriculum.lesson("where-1").unwrap();

    let verdict = validate_lesson(&db.store, lesson, "DROP TABLE employees");
    assert_eq!(verdict.feedback, "Only SELECT queries are allowed.");

    let verdict = validate_lesson(&db.store, lesson, "SELECT nope FROM employees");
    assert_eq!(
        verdict.feedback,
        "Database Error: no such column: nope. Check your query syntax and table/column names."
    );
    let json = serde_json::to_value(&verdict).unwrap();
    assert!(json.get("user_row_count").is_none());
}

#[test]
fn test_missing_curriculum_file() {
    let db = common::demo_db();
    let err = Curriculum::load(&db.path("absent.json")).unwrap_err();
    assert!(matches!(err, ContentError::NotFound(_)));
}

// ============================================================================
// Detective case
// ============================================================================

fn case_file() -> CaseFile {
    serde_json::from_value(json!({
        "title": "The Vanishing Archive",
        "stages": {
            "stage_1": {
                "validation": {
                    "type": "contains_names",
                    "expected_names": ["Marcus Vale"]
                },
                "clue_unlocked": "Marcus was in the building after hours.",
                "next_stage": "final_stage"
            },
            "final_stage": {
                "validation": {
                    "type": "final_report",
                    "must_include_employee": 202,
                    "also_accept": ["Marcus Vale"],
                    "must_show_deletion": true
                },
                "completion_message": "Case closed."
            }
        }
    }))
    .unwrap()
}

#[test]
fn test_solving_a_stage_unlocks_the_clue() {
    let db = common::db_from_script(common::CASE_SCRIPT);
    let case = case_file();
    let stage = case.stage("stage_1").unwrap();

    let outcome = solve_stage(&db.store, stage, "SELECT name FROM employees");
    assert!(outcome.is_correct);
    assert_eq!(outcome.feedback, "Suspects identified correctly!");
    assert_eq!(
        outcome.clue_unlocked,
        Some(json!("Marcus was in the building after hours."))
    );
    assert_eq!(outcome.next_stage, Some(json!("final_stage")));
    assert_eq!(outcome.user_row_count, Some(2));
}

#[test]
fn test_failed_stage_reveals_nothing() {
    let db = common::db_from_script(common::CASE_SCRIPT);
    let case = case_file();
    let stage = case.stage("stage_1").unwrap();

    let outcome = solve_stage(&db.store, stage, "SELECT role FROM employees");
    assert!(!outcome.is_correct);
    assert_eq!(outcome.feedback, "Query must return 'name' column");
    assert!(outcome.clue_unlocked.is_none());
}

#[test]
fn test_final_report() {
    let db = common::db_from_script(common::CASE_SCRIPT);
    let case = case_file();
    let stage = case.stage("final_stage").unwrap();

    let outcome = solve_stage(
        &db.store,
        stage,
        "SELECT e.name, a.timestamp, a.action FROM access_logs a \
         JOIN employees e ON e.employee_id = a.employee_id WHERE a.employee_id = 202",
    );
    assert!(outcome.is_correct, "{}", outcome.feedback);
    assert_eq!(outcome.completion_message, Some(json!("Case closed.")));

    let outcome = solve_stage(
        &db.store,
        stage,
        "SELECT * FROM access_logs WHERE action = 'LOGIN'",
    );
    assert_eq!(outcome.feedback, "Report must show the deletion action");
}

#[test]
fn test_case_database_errors_become_feedback() {
    let db = common::db_from_script(common::CASE_SCRIPT);
    let case = case_file();
    let stage = case.stage("stage_1").unwrap();

    let outcome = solve_stage(&db.store, stage, "SELECT name FROM suspects");
    assert!(!outcome.is_correct);
    assert_eq!(
        outcome.feedback,
        "Database Error: no such table: suspects. Check your query syntax."
    );
}
