//! Lesson curriculum and answer checking.
//!
//! A learner's answer is correct when it returns the same columns, in the
//! same order, and the same rows in any order as the lesson's solution.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::{read_json, ContentResult};
use crate::query::is_read_only;
use crate::store::{DataStore, ExecutionError, QueryResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curriculum {
    pub modules: Vec<Module>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub solution_query: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Curriculum {
    pub fn load(path: &Path) -> ContentResult<Self> {
        read_json(path)
    }

    /// Find a lesson by id across all modules.
    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.modules
            .iter()
            .flat_map(|module| module.lessons.iter())
            .find(|lesson| lesson.id == id)
    }
}

/// Outcome of checking an answer against a lesson.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonVerdict {
    pub is_correct: bool,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_row_count: Option<usize>,
}

impl LessonVerdict {
    fn rejected(feedback: String) -> Self {
        Self {
            is_correct: false,
            feedback,
            user_row_count: None,
            expected_row_count: None,
        }
    }
}

/// Check `query` against `lesson`'s solution.
pub fn validate_lesson(store: &dyn DataStore, lesson: &Lesson, query: &str) -> LessonVerdict {
    let query = query.trim();
    if !is_read_only(query) {
        return LessonVerdict::rejected("Only SELECT queries are allowed.".to_string());
    }

    match run_both(store, query, &lesson.solution_query) {
        Ok((user, expected)) => compare(&user, &expected),
        Err(err) => LessonVerdict::rejected(format!(
            "Database Error: {}. Check your query syntax and table/column names.",
            err
        )),
    }
}

fn run_both(
    store: &dyn DataStore,
    query: &str,
    solution: &str,
) -> Result<(QueryResult, QueryResult), ExecutionError> {
    Ok((store.execute(query)?, store.execute(solution)?))
}

fn compare(user: &QueryResult, expected: &QueryResult) -> LessonVerdict {
    let columns_match = user.columns == expected.columns;
    let rows_match = normalized_rows(user) == normalized_rows(expected);
    let is_correct = columns_match && rows_match;

    let feedback = if is_correct {
        "🎉 Correct! Well done! You can move on to the next lesson.".to_string()
    } else if !columns_match {
        format!(
            "The columns don't match. Expected: {}, but got: {}. Check your SELECT clause.",
            expected.columns.join(", "),
            user.columns.join(", ")
        )
    } else {
        format!(
            "The results don't match the expected output. You got {} rows, expected {} rows. \
             Check your WHERE, JOIN, or GROUP BY clauses.",
            user.row_count(),
            expected.row_count()
        )
    };

    LessonVerdict {
        is_correct,
        feedback,
        user_row_count: Some(user.row_count()),
        expected_row_count: Some(expected.row_count()),
    }
}

/// Rows as a sorted multiset of their JSON encodings.
fn normalized_rows(result: &QueryResult) -> Vec<String> {
    let mut rows: Vec<String> = result
        .rows
        .iter()
        .map(|row| Value::Array(row.clone()).to_string())
        .collect();
    rows.sort();
    rows
}
