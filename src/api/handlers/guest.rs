use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{clean_optional, UpdateGuestRequest};
use crate::domain::models::guest::Guest;
use crate::domain::services::tokens::ensure_ticket_token;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

async fn load_guest(state: &AppState, guest_id: &str) -> Result<Guest, AppError> {
    state.guest_repo.find_by_id(guest_id).await?
        .ok_or(AppError::NotFound("Guest not found".into()))
}

/// Edits name and phone. Attendance is only changed through mark/unmark.
pub async fn update_guest(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(guest_id): Path<String>,
    Json(payload): Json<UpdateGuestRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    let mut guest = load_guest(&state, &guest_id).await?;

    if let Some(name) = payload.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Guest name is required".into()));
        }
        guest.name = name.to_string();
    }
    if let Some(phone) = payload.phone_number {
        guest.phone_number = clean_optional(Some(phone));
    }

    let updated = state.guest_repo.update_details(&guest).await?;

    info!("Updated guest: {}", updated.id);
    state.audit_service.log(
        "Update", "Guest", &updated.id, &actor,
        format!("Updated guest '{}'", updated.name),
    ).await;

    Ok(Json(updated))
}

pub async fn delete_guest(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(guest_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    let guest = load_guest(&state, &guest_id).await?;
    state.guest_repo.delete(&guest.id).await?;

    info!("Deleted guest {}", guest.id);
    state.audit_service.log(
        "Delete", "Guest", &guest.id, &actor,
        format!("Deleted guest '{}'", guest.name),
    ).await;

    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn generate_ticket_token(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(guest_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    let guest = load_guest(&state, &guest_id).await?;
    let guest = ensure_ticket_token(state.guest_repo.as_ref(), guest).await?;
    let token = guest.ticket_token.unwrap_or_default();
    let host = &state.config.public_host;

    Ok(Json(serde_json::json!({
        "ticket_token": token,
        "ticket_url": format!("{}/api/v1/tickets/{}", host, token),
        "checkin_url": format!("{}/api/v1/checkin/{}", host, token),
    })))
}
