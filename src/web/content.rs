//! Lesson and detective-case endpoints.

use std::collections::BTreeMap;
use std::path::Path;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tokio::task;

use crate::case::{solve_stage, CaseFile, StageOutcome};
use crate::content::{read_json, ContentError};
use crate::lessons::{validate_lesson, Curriculum, LessonVerdict};
use crate::store::ColumnInfo;

use super::server::{ApiError, SharedState};

/// Map a content failure, using `missing` as the 404 message.
fn content_error(err: ContentError, missing: &str) -> ApiError {
    match err {
        ContentError::NotFound(_) => ApiError::NotFound(missing.to_string()),
        other => ApiError::Internal(other.to_string()),
    }
}

fn load_raw(path: &Path, missing: &str) -> Result<Value, ApiError> {
    read_json(path).map_err(|err| content_error(err, missing))
}

/// GET /api/curriculum
pub(super) async fn curriculum(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let value = task::spawn_blocking(move || {
        load_raw(&state.curriculum_path, "Curriculum file not found")
    })
    .await??;
    Ok(Json(value))
}

#[derive(Deserialize)]
pub(super) struct ValidateRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    lesson_id: Option<String>,
}

/// POST /api/validate - Check an answer against a lesson's solution
pub(super) async fn validate(
    State(state): State<SharedState>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<LessonVerdict>, ApiError> {
    let query = req.query.trim().to_string();
    let lesson_id = match req.lesson_id {
        Some(id) if !query.is_empty() && !id.is_empty() => id,
        _ => return Err(ApiError::BadRequest("Missing query or lesson_id".to_string())),
    };

    let verdict = task::spawn_blocking(move || {
        // an unreadable curriculum is indistinguishable from an unknown lesson
        let curriculum = Curriculum::load(&state.curriculum_path).ok();
        let lesson = curriculum
            .as_ref()
            .and_then(|c| c.lesson(&lesson_id))
            .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;
        Ok::<_, ApiError>(validate_lesson(state.store.as_ref(), lesson, &query))
    })
    .await??;
    Ok(Json(verdict))
}

/// GET /api/case/load
pub(super) async fn load_case(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let value =
        task::spawn_blocking(move || load_raw(&state.case_file_path, "Case file not found"))
            .await??;
    Ok(Json(value))
}

/// GET /api/case/schema - Tables and columns of the case database
pub(super) async fn case_schema(
    State(state): State<SharedState>,
) -> Result<Json<BTreeMap<String, Vec<ColumnInfo>>>, ApiError> {
    let schema = task::spawn_blocking(move || state.case_store.schema()).await??;
    Ok(Json(schema))
}

#[derive(Deserialize)]
pub(super) struct SolveRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    stage_id: Option<String>,
}

/// POST /api/case/solve - Check a query against a case stage's rubric
pub(super) async fn solve(
    State(state): State<SharedState>,
    Json(req): Json<SolveRequest>,
) -> Result<Json<StageOutcome>, ApiError> {
    let query = req.query.trim().to_string();
    let stage_id = match req.stage_id {
        Some(id) if !query.is_empty() && !id.is_empty() => id,
        _ => return Err(ApiError::BadRequest("Missing query or stage_id".to_string())),
    };

    let outcome = task::spawn_blocking(move || {
        let case = CaseFile::load(&state.case_file_path)
            .map_err(|err| content_error(err, "Case file not found"))?;
        let stage = case
            .stage(&stage_id)
            .ok_or_else(|| ApiError::NotFound("Stage not found".to_string()))?;
        Ok::<_, ApiError>(solve_stage(state.case_store.as_ref(), stage, &query))
    })
    .await??;
    Ok(Json(outcome))
}
