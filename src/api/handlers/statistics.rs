use axum::{extract::{State, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{EventScopeQuery, SearchQuery},
    responses::SearchResults,
};
use crate::domain::models::user::Role;
use crate::domain::services::statistics::{build_dashboard, build_overview};
use crate::error::AppError;
use chrono::Utc;
use std::sync::Arc;

const SEARCH_LIMIT: i64 = 50;

pub async fn overview(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    let events = state.event_repo.list().await?;
    let seniors = state.senior_repo.list_all().await?;
    let guests = state.guest_repo.list_with_context().await?;

    Ok(Json(build_overview(&events, &seniors, &guests)))
}

/// Senior-role viewers are always scoped to their assigned event.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(query): Query<EventScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let scope = if actor.is_staff() {
        query.event_id.filter(|id| !id.is_empty())
    } else {
        match (actor.role, actor.assigned_event_id.clone()) {
            (Some(Role::Senior), Some(assigned)) => Some(assigned),
            _ => return Err(AppError::Forbidden("You do not have access to statistics".into())),
        }
    };

    if let Some(event_id) = scope.as_deref() {
        state.event_repo.find_by_id(event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;
    }

    let events = state.event_repo.list().await?;
    let seniors = state.senior_repo.list_all().await?;
    let guests = state.guest_repo.list_with_context().await?;

    Ok(Json(build_dashboard(&events, &seniors, &guests, scope.as_deref(), Utc::now())))
}

/// Name or phone substring over seniors and guests of active events.
pub async fn search(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_staff()?;

    let term = query.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Ok(Json(SearchResults { seniors: Vec::new(), guests: Vec::new() }));
    }

    let seniors = state.senior_repo.search_in_active_events(term, SEARCH_LIMIT).await?;
    let guests = state.guest_repo.search_in_active_events(term, SEARCH_LIMIT).await?;

    Ok(Json(SearchResults { seniors, guests }))
}
