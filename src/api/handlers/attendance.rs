use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use std::sync::Arc;

pub async fn mark_guest(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(guest_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.checkin_service.mark(&guest_id, &actor).await?;
    Ok(Json(guest))
}

pub async fn unmark_guest(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(guest_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guest = state.checkin_service.unmark(&guest_id, &actor).await?;
    Ok(Json(guest))
}
