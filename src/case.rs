//! The guided detective case: stages, rubrics and solving.
//!
//! Each stage carries a `validation` rubric tagged by `type`. A learner's
//! query is executed against the case database and its result is checked
//! against the rubric of the stage they are on.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::{read_json, values_equal, ContentResult};
use crate::query::is_read_only;
use crate::store::{DataStore, QueryResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseFile {
    pub stages: BTreeMap<String, Stage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CaseFile {
    pub fn load(path: &Path) -> ContentResult<Self> {
        read_json(path)
    }

    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.get(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// Raw rubric; parsed on use so a malformed rubric only affects its stage.
    #[serde(default)]
    pub validation: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clue_unlocked: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_message: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stage {
    pub fn rubric(&self) -> Validation {
        serde_json::from_value(self.validation.clone()).unwrap_or(Validation::Unrecognized)
    }
}

fn one() -> usize {
    1
}

fn deletion_marker() -> String {
    "DELETED".to_string()
}

/// A stage rubric.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Validation {
    /// Required columns present, same row count, every expected row found.
    ExactColumns {
        #[serde(default)]
        required_columns: Vec<String>,
        #[serde(default)]
        expected_data: Vec<Map<String, Value>>,
    },
    /// An `employee_id` column containing the expected ids.
    ContainsIds {
        #[serde(default)]
        expected_employee_ids: Vec<Value>,
        #[serde(default)]
        min_count: usize,
    },
    ContainsNames {
        #[serde(default)]
        expected_names: Vec<String>,
    },
    ExactCountAndNames {
        #[serde(default)]
        expected_names: Vec<String>,
        #[serde(default)]
        expected_count: usize,
    },
    /// A timeline: required columns, optionally sorted by `timestamp` and
    /// containing an `action`.
    OrderedSequence {
        #[serde(default)]
        required_columns: Vec<String>,
        #[serde(default)]
        must_be_ordered: bool,
        #[serde(default)]
        must_contain_action: Option<Value>,
    },
    ContainsText {
        #[serde(default)]
        must_contain_keywords: Vec<String>,
        #[serde(default = "one")]
        min_results: usize,
    },
    /// Some row mentions the employee (by id or an accepted alias), and
    /// optionally some row shows the deletion marker.
    FinalReport {
        #[serde(default)]
        must_include_employee: Option<Value>,
        #[serde(default)]
        also_accept: Vec<String>,
        #[serde(default)]
        must_show_deletion: bool,
        #[serde(default = "deletion_marker")]
        deletion_marker: String,
    },
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageVerdict {
    pub passed: bool,
    pub feedback: String,
}

impl StageVerdict {
    fn pass(feedback: &str) -> Self {
        Self {
            passed: true,
            feedback: feedback.to_string(),
        }
    }

    fn fail(feedback: impl Into<String>) -> Self {
        Self {
            passed: false,
            feedback: feedback.into(),
        }
    }
}

/// Check a query result against a rubric.
pub fn validate_stage(result: &QueryResult, validation: &Validation) -> StageVerdict {
    let columns = &result.columns;
    let rows = &result.rows;

    match validation {
        Validation::ExactColumns {
            required_columns,
            expected_data,
        } => {
            if let Some(missing) = first_missing(columns, required_columns) {
                return StageVerdict::fail(format!("Missing required column: {}", missing));
            }
            if rows.len() != expected_data.len() {
                return StageVerdict::fail(format!(
                    "Expected {} row(s), got {}",
                    expected_data.len(),
                    rows.len()
                ));
            }
            let maps = result.row_maps();
            let all_found = expected_data.iter().all(|expected| {
                maps.iter().any(|row| {
                    expected.iter().all(|(key, value)| {
                        values_equal(row.get(key).unwrap_or(&Value::Null), value)
                    })
                })
            });
            if !all_found {
                return StageVerdict::fail("Expected data not found in results");
            }
            StageVerdict::pass("Correct!")
        }

        Validation::ContainsIds {
            expected_employee_ids,
            min_count,
        } => {
            let Some(found) = distinct_column(result, "employee_id") else {
                return StageVerdict::fail("Query must return employee_id column");
            };
            if found.len() < *min_count {
                return StageVerdict::fail(format!(
                    "Expected at least {} employees, found {}",
                    min_count,
                    found.len()
                ));
            }
            for id in expected_employee_ids {
                if !found.iter().any(|v| values_equal(v, id)) {
                    return StageVerdict::fail(format!(
                        "Missing expected employee ID: {}",
                        render(id)
                    ));
                }
            }
            StageVerdict::pass("All suspects identified!")
        }

        Validation::ContainsNames { expected_names } => {
            let Some(found) = distinct_column(result, "name") else {
                return StageVerdict::fail("Query must return 'name' column");
            };
            match first_missing_name(&found, expected_names) {
                Some(name) => StageVerdict::fail(format!("Missing expected person: {}", name)),
                None => StageVerdict::pass("Suspects identified correctly!"),
            }
        }

        Validation::ExactCountAndNames {
            expected_names,
            expected_count,
        } => {
            let Some(found) = distinct_column(result, "name") else {
                return StageVerdict::fail("Query must return 'name' column");
            };
            if rows.len() != *expected_count {
                return StageVerdict::fail(format!(
                    "Expected exactly {} results, got {}",
                    expected_count,
                    rows.len()
                ));
            }
            match first_missing_name(&found, expected_names) {
                Some(name) => StageVerdict::fail(format!("Missing expected person: {}", name)),
                None => StageVerdict::pass("Correct capability analysis!"),
            }
        }

        Validation::OrderedSequence {
            required_columns,
            must_be_ordered,
            must_contain_action,
        } => {
            if let Some(missing) = first_missing(columns, required_columns) {
                return StageVerdict::fail(format!("Missing required column: {}", missing));
            }
            if let (Some(action), Some(idx)) = (must_contain_action, column_index(columns, "action"))
            {
                if !rows.iter().any(|row| values_equal(cell(row, idx), action)) {
                    return StageVerdict::fail(format!(
                        "Results must contain action: {}",
                        render(action)
                    ));
                }
            }
            if *must_be_ordered {
                if let Some(idx) = column_index(columns, "timestamp") {
                    let sorted = rows.windows(2).all(|pair| {
                        compare_values(cell(&pair[0], idx), cell(&pair[1], idx))
                            != Ordering::Greater
                    });
                    if !sorted {
                        return StageVerdict::fail("Results must be ordered by timestamp");
                    }
                }
            }
            StageVerdict::pass("Timeline constructed correctly!")
        }

        Validation::ContainsText {
            must_contain_keywords,
            min_results,
        } => {
            if rows.len() < *min_results {
                return StageVerdict::fail(format!(
                    "Expected at least {} result(s)",
                    min_results
                ));
            }
            let found = rows.iter().map(|row| row_text(row)).any(|text| {
                must_contain_keywords
                    .iter()
                    .any(|keyword| text.contains(keyword.as_str()))
            });
            if !found {
                return StageVerdict::fail("Memo with relevant information not found");
            }
            StageVerdict::pass("Motive discovered!")
        }

        Validation::FinalReport {
            must_include_employee,
            also_accept,
            must_show_deletion,
            deletion_marker,
        } => {
            let employee = must_include_employee.as_ref().map(render);
            let texts: Vec<String> = rows.iter().map(|row| row_text(row)).collect();

            let has_employee = texts.iter().any(|text| {
                employee.as_ref().is_some_and(|e| text.contains(e.as_str()))
                    || also_accept.iter().any(|alias| text.contains(alias.as_str()))
            });
            if !has_employee {
                return StageVerdict::fail(format!(
                    "Report must include data about employee {}",
                    employee.unwrap_or_default()
                ));
            }
            if *must_show_deletion
                && !texts.iter().any(|text| text.contains(deletion_marker.as_str()))
            {
                return StageVerdict::fail("Report must show the deletion action");
            }
            StageVerdict::pass("Case solved! Evidence compiled successfully!")
        }

        Validation::Unrecognized => StageVerdict::fail("Validation type not recognized"),
    }
}

/// Outcome of a solve attempt, as returned to the learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutcome {
    pub is_correct: bool,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clue_unlocked: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_message: Option<Value>,
}

impl StageOutcome {
    fn rejected(feedback: String) -> Self {
        Self {
            is_correct: false,
            feedback,
            user_row_count: None,
            clue_unlocked: None,
            next_stage: None,
            completion_message: None,
        }
    }
}

/// Run `query` against the case database and check it against `stage`.
pub fn solve_stage(store: &dyn DataStore, stage: &Stage, query: &str) -> StageOutcome {
    let query = query.trim();
    if !is_read_only(query) {
        return StageOutcome::rejected("Only SELECT queries are allowed.".to_string());
    }

    let result = match store.execute(query) {
        Ok(result) => result,
        Err(err) => {
            return StageOutcome::rejected(format!(
                "Database Error: {}. Check your query syntax.",
                err
            ))
        }
    };

    let verdict = validate_stage(&result, &stage.rubric());
    let mut outcome = StageOutcome {
        is_correct: verdict.passed,
        feedback: verdict.feedback,
        user_row_count: Some(result.row_count()),
        clue_unlocked: None,
        next_stage: None,
        completion_message: None,
    };
    if verdict.passed {
        outcome.clue_unlocked = stage.clue_unlocked.clone();
        outcome.next_stage = stage.next_stage.clone();
        outcome.completion_message = stage.completion_message.clone();
    }
    outcome
}

// ============================================================================
// Helpers
// ============================================================================

fn column_index(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c == name)
}

fn first_missing<'a>(columns: &[String], required: &'a [String]) -> Option<&'a str> {
    required
        .iter()
        .find(|col| !columns.contains(col))
        .map(String::as_str)
}

static NULL: Value = Value::Null;

/// The value at `idx`, reading a short row's missing cells as null.
fn cell(row: &[Value], idx: usize) -> &Value {
    row.get(idx).unwrap_or(&NULL)
}

/// Distinct values of a column, or `None` when the column is absent.
fn distinct_column(result: &QueryResult, name: &str) -> Option<Vec<Value>> {
    let idx = column_index(&result.columns, name)?;
    let mut found: Vec<Value> = Vec::new();
    for row in &result.rows {
        let value = cell(row, idx);
        if !found.iter().any(|v| values_equal(v, value)) {
            found.push(value.clone());
        }
    }
    Some(found)
}

fn first_missing_name<'a>(found: &[Value], expected: &'a [String]) -> Option<&'a str> {
    expected
        .iter()
        .find(|name| !found.iter().any(|v| v.as_str() == Some(name.as_str())))
        .map(String::as_str)
}

/// Plain text of a scalar: strings unquoted, null as `None`.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

fn row_text(row: &[Value]) -> String {
    row.iter().map(render).collect::<Vec<_>>().join(" ")
}

/// Ordering for timeline checks: nulls first, numbers by value, then text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => render(a).cmp(&render(b)),
        },
    }
}
