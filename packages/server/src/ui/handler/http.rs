//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::ui::state::AppState;

/// Response body of `GET /api/connections`
#[derive(Debug, Serialize)]
pub struct ConnectionCountDto {
    pub connections: usize,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Number of live websocket connections
pub async fn connection_count(State(state): State<Arc<AppState>>) -> Json<ConnectionCountDto> {
    Json(ConnectionCountDto {
        connections: state.registry.len(),
    })
}
