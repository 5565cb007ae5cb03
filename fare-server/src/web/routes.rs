//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::graph::{ConnectivityGraph, GraphError};
use crate::query::{QueryEngine, QueryError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/query", post(query_trips))
        .route("/airports/:snapshot", get(list_airports))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Find the cheapest round trips.
async fn query_trips(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: QueryRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, body = %String::from_utf8_lossy(&body), "invalid query body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;
    let request = req
        .into_request()
        .map_err(|message| AppError::BadRequest { message })?;

    // Reject bad requests before any snapshot is read
    request.validate(&state.config)?;

    let graph = load_merged_graph(&state).await?;
    let engine = QueryEngine::new(state.prices.as_ref(), &graph, &state.config);
    let trips = engine.query_and_match(&request).await?;

    let trips = trips.iter().map(TripResult::from_trip).collect();
    Ok(Json(QueryResponse { trips }).into_response())
}

/// Union of every configured snapshot.
///
/// A snapshot that has not been written yet contributes nothing.
async fn load_merged_graph(state: &AppState) -> Result<ConnectivityGraph, AppError> {
    let mut merged = ConnectivityGraph::new();
    for name in state.snapshots.iter() {
        match ConnectivityGraph::load(state.graphs.as_ref(), name).await {
            Ok(graph) => merged.merge(graph),
            Err(e) if e.is_not_found() => {
                tracing::warn!(snapshot = %name, "snapshot missing, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(merged)
}

/// List the airports in one snapshot.
async fn list_airports(
    State(state): State<AppState>,
    Path(snapshot): Path<String>,
) -> Result<Response, AppError> {
    if !state.snapshots.iter().any(|s| *s == snapshot) {
        return Err(AppError::BadRequest {
            message: format!("Unknown snapshot: {snapshot}"),
        });
    }

    let graph = ConnectivityGraph::load(state.graphs.as_ref(), &snapshot).await?;
    let airports = graph.airports().cloned().collect();
    Ok(Json(AirportsResponse { snapshot, airports }).into_response())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Validation(message) => AppError::BadRequest { message },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<GraphError> for AppError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::NotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            GraphError::InvalidName(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        } else {
            tracing::debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
