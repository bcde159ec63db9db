//! Axum server: router, shared state, query and schema endpoints.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{net::TcpListener, task};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::analysis::{run_query, QueryError, QueryReport};
use crate::config::ServerSettings;
use crate::store::{ColumnInfo, DataStore, ExecutionError};

use super::content;

/// Application state shared across handlers.
pub struct AppState {
    /// Main learning database.
    pub store: Arc<dyn DataStore>,
    /// Database the detective case is played against.
    pub case_store: Arc<dyn DataStore>,
    pub curriculum_path: PathBuf,
    pub case_file_path: PathBuf,
}

pub(super) type SharedState = Arc<AppState>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind or serve: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("{0}")]
    Internal(String),

    #[error("internal task failure: {0}")]
    Join(#[from] task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Query(err) => (StatusCode::BAD_REQUEST, err.user_message()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        (status, Json(ErrorPayload { error: message })).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorPayload {
    error: String,
}

/// Build the router with all routes.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let state: SharedState = Arc::new(state);

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/api/query", post(query))
        .route("/api/schema", get(schema))
        .route("/api/curriculum", get(content::curriculum))
        .route("/api/validate", post(content::validate))
        .route("/api/case/load", get(content::load_case))
        .route("/api/case/schema", get(content::case_schema))
        .route("/api/case/solve", post(content::solve));

    if let Some(cors) = build_cors_layer(cors_origins) {
        router = router.layer(cors);
    }

    router.with_state(state).layer(TraceLayer::new_for_http())
}

fn build_cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]),
    )
}

/// Start the server and run until ctrl-c.
pub async fn serve(state: AppState, settings: &ServerSettings) -> Result<(), ServerError> {
    let app = router(state, &settings.cors_origins);
    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(%addr, cors_origins = ?settings.cors_origins, "sqlviz listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("sqlviz stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => tracing::error!(?err, "failed to listen for shutdown signal"),
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Deserialize)]
struct QueryRequest {
    #[serde(default)]
    query: String,
}

/// POST /api/query - Visualize, execute and lint a query
async fn query(
    State(state): State<SharedState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryReport>, ApiError> {
    let report = task::spawn_blocking(move || run_query(state.store.as_ref(), &req.query)).await??;
    Ok(Json(report))
}

/// GET /api/schema - Tables and columns of the main database
async fn schema(
    State(state): State<SharedState>,
) -> Result<Json<BTreeMap<String, Vec<ColumnInfo>>>, ApiError> {
    let schema = task::spawn_blocking(move || state.store.schema()).await??;
    Ok(Json(schema))
}
