use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use std::sync::Arc;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "dashboard_connections": state.hub.connection_count().await,
    }))
}
