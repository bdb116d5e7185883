//! API Handlers
//!
//! HTTP request handlers exposing one storage namespace.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{ApiError, ApiResult};
use crate::models::{
    GetResponse, HealthResponse, KeysResponse, MessageResponse, SetRequest, StatsResponse,
};
use crate::storage::{DynBackend, Storage};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store shared with the sweep task
    pub storage: Arc<RwLock<Storage<DynBackend>>>,
}

impl AppState {
    pub fn new(storage: Storage<DynBackend>) -> Self {
        Self {
            storage: Arc::new(RwLock::new(storage)),
        }
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let mut storage = state.storage.write().await;
    if !storage.set(&req.key, &req.value, req.expiration_minutes) {
        return Err(ApiError::Internal(format!("could not store '{}'", req.key)));
    }

    Ok(Json(MessageResponse::set(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<GetResponse>> {
    // Write lock: reading an expired entry deletes it
    let mut storage = state.storage.write().await;
    match storage.get::<serde_json::Value>(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(ApiError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let mut storage = state.storage.write().await;
    if !storage.has(&key) {
        return Err(ApiError::NotFound(key));
    }
    if !storage.remove(&key) {
        return Err(ApiError::Internal(format!("could not delete '{}'", key)));
    }

    Ok(Json(MessageResponse::deleted(key)))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    let storage = state.storage.read().await;
    let mut keys = storage.keys();
    keys.sort();

    Json(KeysResponse {
        keys,
        total_size: storage.get_total_size(),
    })
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> ApiResult<Json<MessageResponse>> {
    let mut storage = state.storage.write().await;
    if !storage.clear() {
        return Err(ApiError::Internal(
            "some keys could not be removed".to_string(),
        ));
    }

    Ok(Json(MessageResponse::cleared(storage.prefix())))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let storage = state.storage.read().await;
    let keys = storage.keys();

    Json(StatsResponse::new(
        &storage.stats(),
        keys.len(),
        storage.get_total_size(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
