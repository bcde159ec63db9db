//! HTTP tests driving the router in-process with `tower::ServiceExt::oneshot`.

#[path = "../common/mod.rs"]
mod common;

use std::fs;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlviz::store::SqliteStore;
use sqlviz::web::{router, AppState};
use tower::ServiceExt;

struct TestApp {
    _main: common::Fixture,
    _case: common::Fixture,
    router: Router,
}

fn app() -> TestApp {
    let main = common::demo_db();
    let case = common::db_from_script(common::CASE_SCRIPT);

    let curriculum_path = main.path("curriculum.json");
    fs::write(
        &curriculum_path,
        json!({"modules": [{"lessons": [
            {"id": "l1", "solution_query": "SELECT name FROM departments"}
        ]}]})
        .to_string(),
    )
    .unwrap();

    let state = AppState {
        store: Arc::new(SqliteStore::new(main.store.path())),
        case_store: Arc::new(SqliteStore::new(case.store.path())),
        curriculum_path,
        // deliberately absent
        case_file_path: case.path("case_file.json"),
    };

    TestApp {
        router: router(state, &["http://localhost:3000".to_string()]),
        _main: main,
        _case: case,
    }
}

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_query_endpoint() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/query",
        Some(json!({"query": "SELECT name FROM employees WHERE salary > 100000"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["columns"], json!(["name"]));
    assert_eq!(body["results"]["rows"].as_array().unwrap().len(), 2);
    let clauses: Vec<&str> = body["visualization"]
        .as_array()
        .unwrap()
        .iter()
        .map(|step| step["clause"].as_str().unwrap())
        .collect();
    assert_eq!(clauses, vec!["FROM", "WHERE", "SELECT"]);
    assert!(body["complexity"]["score"].is_u64());
}

#[tokio::test]
async fn test_query_errors_are_bad_requests() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/query",
        Some(json!({"query": "UPDATE employees SET salary = 0"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Only SELECT queries are allowed. Please start your query with SELECT."
    );

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/query",
        Some(json!({"query": "SELECT * FROM ghosts"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Database Error: no such table: ghosts. The table does not exist in the database."
    );
}

#[tokio::test]
async fn test_schema_endpoints() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["departments"][0],
        json!({"name": "id", "type": "INTEGER", "pk": true})
    );
    assert!(body.get("employees").is_some());

    let (status, body) = send(&app, Method::GET, "/api/case/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("access_logs").is_some());
}

#[tokio::test]
async fn test_lesson_endpoints() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/curriculum", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modules"][0]["lessons"][0]["id"], "l1");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/validate",
        Some(json!({"query": "SELECT name FROM departments ORDER BY name", "lesson_id": "l1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_correct"], true);
    assert_eq!(body["expected_row_count"], 5);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/validate",
        Some(json!({"query": "SELECT 1", "lesson_id": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Lesson not found");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/validate",
        Some(json!({"query": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing query or lesson_id");
}

#[tokio::test]
async fn test_missing_case_file() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/case/load", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Case file not found");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/case/solve",
        Some(json!({"query": "SELECT name FROM employees", "stage_id": "stage_1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Case file not found");
}
