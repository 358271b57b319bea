//! Liveness and store-connectivity handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::Result;
use crate::metrics;

use super::AppState;

/// Liveness payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy".
    pub status: &'static str,
    /// Human-readable banner.
    pub message: &'static str,
}

/// Store probe payload.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    /// "success" when the write landed.
    pub status: &'static str,
    /// Which backend handled the write.
    pub backend: &'static str,
    /// Human-readable detail.
    pub message: &'static str,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        message: "UniMind API is running",
    })
}

/// Store connectivity probe - writes a throwaway test document.
pub async fn store_probe(State(state): State<AppState>) -> Result<Json<ProbeResponse>> {
    state.store.probe().await.inspect_err(|_| {
        metrics::inc_store_errors();
    })?;

    Ok(Json(ProbeResponse {
        status: "success",
        backend: state.store.backend(),
        message: "test document written",
    }))
}
