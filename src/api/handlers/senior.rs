use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{clean_optional, CreateGuestRequest, CreateSeniorRequest, UpdateSeniorRequest},
    responses::SeniorDetail,
};
use crate::domain::models::{guest::Guest, senior::Senior, user::Actor};
use crate::domain::services::tokens::ensure_share_token;
use crate::error::AppError;
use std::sync::Arc;
use tracing::{info, warn};

async fn load_senior(state: &AppState, senior_id: &str) -> Result<Senior, AppError> {
    state.senior_repo.find_by_id(senior_id).await?
        .ok_or(AppError::NotFound("Senior not found".into()))
}

async fn ensure_event_exists(state: &AppState, event_id: Option<&str>) -> Result<(), AppError> {
    if let Some(event_id) = event_id {
        state.event_repo.find_by_id(event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;
    }
    Ok(())
}

/// Event-less seniors are only visible to staff.
fn ensure_senior_access(actor: &Actor, senior: &Senior) -> Result<(), AppError> {
    match senior.event_id.as_deref() {
        Some(event_id) => actor.ensure_event_access(event_id),
        None => actor.ensure_staff(),
    }
}

fn required_name(raw: &str, what: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::Validation(format!("{} name is required", what)));
    }
    Ok(name.to_string())
}

fn guest_quota(n: i32) -> Result<i32, AppError> {
    if n < 0 {
        return Err(AppError::Validation("Number of guests cannot be negative".into()));
    }
    Ok(n)
}

pub async fn create_senior(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CreateSeniorRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    let event_id = clean_optional(payload.event_id);
    ensure_event_exists(&state, event_id.as_deref()).await?;

    let senior = Senior::new(
        event_id,
        required_name(&payload.name, "Senior")?,
        clean_optional(payload.phone_number),
        guest_quota(payload.number_of_guests)?,
    );
    let created = state.senior_repo.create(&senior).await?;

    info!("Created senior: {}", created.id);
    state.audit_service.log(
        "Create", "Senior", &created.id, &actor,
        format!("Created senior '{}' with {} guest slots", created.name, created.number_of_guests),
    ).await;

    Ok(Json(created))
}

pub async fn get_senior(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(senior_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let senior = load_senior(&state, &senior_id).await?;
    ensure_senior_access(&actor, &senior)?;

    let guests = state.guest_repo.list_by_senior(&senior.id).await?;
    Ok(Json(SeniorDetail { senior, guests }))
}

pub async fn update_senior(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(senior_id): Path<String>,
    Json(payload): Json<UpdateSeniorRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    let mut senior = load_senior(&state, &senior_id).await?;

    if let Some(event_id) = payload.event_id {
        let event_id = clean_optional(Some(event_id));
        ensure_event_exists(&state, event_id.as_deref()).await?;
        senior.event_id = event_id;
    }
    if let Some(name) = payload.name {
        senior.name = required_name(&name, "Senior")?;
    }
    if let Some(phone) = payload.phone_number {
        senior.phone_number = clean_optional(Some(phone));
    }
    if let Some(n) = payload.number_of_guests {
        // Quota only gates new guests; lowering it leaves existing ones in place
        senior.number_of_guests = guest_quota(n)?;
    }

    let updated = state.senior_repo.update(&senior).await?;

    info!("Updated senior: {}", updated.id);
    state.audit_service.log(
        "Update", "Senior", &updated.id, &actor,
        format!("Updated senior '{}'", updated.name),
    ).await;

    Ok(Json(updated))
}

pub async fn delete_senior(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(senior_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    let senior = load_senior(&state, &senior_id).await?;
    state.senior_repo.delete(&senior.id).await?;

    info!("Deleted senior {}", senior.id);
    state.audit_service.log(
        "Delete", "Senior", &senior.id, &actor,
        format!("Deleted senior '{}' and their guests", senior.name),
    ).await;

    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn add_guest(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(senior_id): Path<String>,
    Json(payload): Json<CreateGuestRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    let senior = load_senior(&state, &senior_id).await?;
    let name = required_name(&payload.name, "Guest")?;

    let current = state.guest_repo.count_by_senior(&senior.id).await?;
    if !senior.has_room_for_guest(current) {
        warn!(senior_id = %senior.id, current, quota = senior.number_of_guests, "Guest quota reached");
        return Err(AppError::Conflict(format!("Guest limit reached ({}).", senior.number_of_guests)));
    }

    let guest = Guest::new(senior.id.clone(), name, clean_optional(payload.phone_number));
    let created = state.guest_repo.create(&guest).await?;

    info!("Added guest {} to senior {}", created.id, senior.id);
    state.audit_service.log(
        "Create", "Guest", &created.id, &actor,
        format!("Added guest '{}' to senior '{}'", created.name, senior.name),
    ).await;

    Ok(Json(created))
}

pub async fn generate_share_token(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(senior_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    let senior = load_senior(&state, &senior_id).await?;
    let senior = ensure_share_token(state.senior_repo.as_ref(), senior).await?;
    let token = senior.share_token.unwrap_or_default();

    Ok(Json(serde_json::json!({
        "share_token": token,
        "share_url": format!("{}/api/v1/share/{}", state.config.public_host, token),
    })))
}
