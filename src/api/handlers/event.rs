use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{clean_optional, CreateEventRequest, PageQuery, UpdateEventRequest},
    responses::{page_window, BulkTokenResult, LegacyMigrationResult, Page},
};
use crate::domain::models::{event::{Event, LEGACY_EVENT_NAME}, user::Role};
use crate::domain::services::tokens::{ensure_share_token, ensure_ticket_token};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

pub const SENIORS_PAGE_SIZE: i64 = 12;

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_admin()?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Event name is required".into()));
    }

    let mut event = Event::new(name, payload.date, payload.location.trim().to_string(), payload.is_active.unwrap_or(true));
    event.ticket_title = clean_optional(payload.ticket_title);
    event.ticket_date_display = clean_optional(payload.ticket_date_display);
    event.ticket_location_display = clean_optional(payload.ticket_location_display);
    event.ticket_map_url = clean_optional(payload.ticket_map_url);
    event.ticket_time_display = clean_optional(payload.ticket_time_display);
    event.ticket_welcome_message = clean_optional(payload.ticket_welcome_message);

    let created = state.event_repo.create(&event).await?;

    info!("Created event: {} ({})", created.name, created.id);
    state.audit_service.log(
        "Create", "Event", &created.id, &actor,
        format!("Created event '{}'", created.name),
    ).await;

    Ok(Json(created))
}

/// Staff see every event; Senior-role viewers only their assigned one.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    if actor.is_staff() {
        return Ok(Json(state.event_repo.list().await?));
    }

    match (actor.role, actor.assigned_event_id.as_deref()) {
        (Some(Role::Senior), Some(event_id)) => {
            let events: Vec<Event> = state.event_repo.find_by_id(event_id).await?.into_iter().collect();
            Ok(Json(events))
        }
        _ => Err(AppError::Forbidden("You do not have access to events".into())),
    }
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_event_access(&event_id)?;

    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_admin()?;

    let mut event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Event name is required".into()));
        }
        event.name = name;
    }
    if let Some(date) = payload.date { event.date = date; }
    if let Some(location) = payload.location { event.location = location.trim().to_string(); }
    if let Some(is_active) = payload.is_active { event.is_active = is_active; }

    override_text(&mut event.ticket_title, payload.ticket_title);
    override_text(&mut event.ticket_date_display, payload.ticket_date_display);
    override_text(&mut event.ticket_location_display, payload.ticket_location_display);
    override_text(&mut event.ticket_map_url, payload.ticket_map_url);
    override_text(&mut event.ticket_time_display, payload.ticket_time_display);
    override_text(&mut event.ticket_welcome_message, payload.ticket_welcome_message);

    let updated = state.event_repo.update(&event).await?;

    info!(event_id = %updated.id, is_active = updated.is_active, "Updated event");
    state.audit_service.log(
        "Update", "Event", &updated.id, &actor,
        format!("Updated event '{}' (active: {})", updated.name, updated.is_active),
    ).await;

    Ok(Json(updated))
}

fn override_text(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        *target = clean_optional(Some(v));
    }
}

/// Deleting an event cascades to its seniors and their guests.
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_admin()?;

    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    state.event_repo.delete(&event.id).await?;

    info!("Deleted event {}", event.id);
    state.audit_service.log(
        "Delete", "Event", &event.id, &actor,
        format!("Deleted event '{}'", event.name),
    ).await;

    Ok(Json(serde_json::json!({"status": "deleted"})))
}

/// Moves every senior without an event into the "Legacy Data" event.
pub async fn migrate_legacy(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_admin()?;

    let legacy = match state.event_repo.find_by_name(LEGACY_EVENT_NAME).await? {
        Some(event) => event,
        None => {
            let event = Event::new(LEGACY_EVENT_NAME.to_string(), Utc::now(), String::new(), true);
            state.event_repo.create(&event).await?
        }
    };

    let moved = state.senior_repo.assign_unassigned_to_event(&legacy.id).await?;

    info!(event_id = %legacy.id, moved, "Migrated unassigned seniors");
    state.audit_service.log(
        "Migrate", "Event", &legacy.id, &actor,
        format!("Moved {} unassigned seniors to '{}'", moved, legacy.name),
    ).await;

    Ok(Json(LegacyMigrationResult { event_id: legacy.id, moved }))
}

pub async fn list_event_seniors(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_event_access(&event_id)?;

    state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let (page, limit, offset) = page_window(query.page, SENIORS_PAGE_SIZE)?;
    let total = state.senior_repo.count_by_event(&event_id).await?;
    let seniors = state.senior_repo.list_by_event(&event_id, limit, offset).await?;

    Ok(Json(Page::new(seniors, page, SENIORS_PAGE_SIZE, total)))
}

/// Ensures share tokens for every senior of the event and ticket tokens for their guests.
pub async fn generate_event_tokens(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let total = state.senior_repo.count_by_event(&event_id).await?;
    let seniors = state.senior_repo.list_by_event(&event_id, total, 0).await?;

    let mut result = BulkTokenResult { seniors: 0, guests: 0 };
    for senior in seniors {
        let senior = ensure_share_token(state.senior_repo.as_ref(), senior).await?;
        result.seniors += 1;

        for guest in state.guest_repo.list_by_senior(&senior.id).await? {
            ensure_ticket_token(state.guest_repo.as_ref(), guest).await?;
            result.guests += 1;
        }
    }

    info!(event_id = %event_id, seniors = result.seniors, guests = result.guests, "Generated event tokens");
    Ok(Json(result))
}
