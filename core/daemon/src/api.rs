//! REST surface of the status store.
//!
//! - `GET    /api/statuses`      full status map
//! - `POST   /api/status`        `{name, status}` → `{success, statuses}`
//! - `DELETE /api/status/:name`  → `{success, statuses}`
//! - `GET    /api/health`

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use rollcall_core::{FileStatusStore, StatusStore, StoreError};
use rollcall_protocol::{
    parse_upsert, HealthResponse, MutationResponse, StatusMap, MAX_REQUEST_BYTES,
    MISSING_FIELDS_MESSAGE,
};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    store: Arc<FileStatusStore>,
}

impl AppState {
    pub fn new(store: Arc<FileStatusStore>) -> Self {
        Self { store }
    }

    /// Runs `op` against the store on the blocking pool.
    async fn with_store<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&FileStatusStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|err| StoreError::unavailable("Store task failed", err))?
    }
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/statuses", get(get_statuses))
        .route("/status", post(upsert_status))
        .route("/status/:name", delete(delete_status))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn get_statuses(State(state): State<AppState>) -> Result<Json<StatusMap>, ApiError> {
    let statuses = state
        .with_store(|store| store.get_all())
        .await
        .map_err(|err| {
            error!(error = %err, "Error reading data");
            ApiError::ReadFailed
        })?;
    tracing::debug!(members = statuses.len(), "Status snapshot");
    Ok(Json(statuses))
}

async fn upsert_status(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MutationResponse>, ApiError> {
    let params: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string()))?;
    let request = parse_upsert(params).map_err(|err| ApiError::BadRequest(err.message))?;

    info!(
        member = %request.name,
        category = ?request.status.category(),
        "Received status"
    );

    let statuses = state
        .with_store(move |store| store.upsert(&request.name, request.status))
        .await
        .map_err(|err| {
            error!(error = %err, "Error updating status");
            ApiError::from_write(err, ApiError::UpdateFailed)
        })?;
    Ok(Json(MutationResponse::ok(statuses)))
}

async fn delete_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    info!(member = %name, "Deleting status");
    let statuses = state
        .with_store(move |store| store.remove(&name))
        .await
        .map_err(|err| {
            error!(error = %err, "Error deleting status");
            ApiError::from_write(err, ApiError::DeleteFailed)
        })?;
    Ok(Json(MutationResponse::ok(statuses)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let statuses = state
        .with_store(|store| store.get_all())
        .await
        .map_err(|err| {
            error!(error = %err, "Health check could not read data");
            ApiError::ReadFailed
        })?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        members: statuses.len(),
    }))
}
