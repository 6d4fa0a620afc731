//! Token-addressed routes. The share or ticket token is the capability; no
//! login is required.

use axum::{
    extract::{State, Path},
    http::header,
    response::IntoResponse,
    Json,
};
use crate::state::AppState;
use crate::api::extractors::maybe_auth::MaybeAuthUser;
use crate::api::dtos::responses::{PublicGuest, SharePage, TicketEvent, TicketView};
use crate::domain::models::{event::Event, guest::Guest, senior::Senior};
use crate::error::AppError;
use qrcode::{render::svg, QrCode};
use std::sync::Arc;
use tracing::info;

fn checkin_url(state: &AppState, ticket_token: &str) -> String {
    format!("{}/api/v1/checkin/{}", state.config.public_host, ticket_token)
}

async fn event_of(state: &AppState, senior: &Senior) -> Result<Option<Event>, AppError> {
    match senior.event_id.as_deref() {
        Some(event_id) => state.event_repo.find_by_id(event_id).await,
        None => Ok(None),
    }
}

async fn guest_by_ticket(state: &AppState, token: &str) -> Result<Guest, AppError> {
    state.guest_repo.find_by_ticket_token(token).await?
        .ok_or(AppError::NotFound("Ticket not found".into()))
}

pub async fn get_share_page(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let senior = state.senior_repo.find_by_share_token(&token).await?
        .ok_or(AppError::NotFound("Invitation not found".into()))?;

    let guests = state.guest_repo.list_by_senior(&senior.id).await?;
    let event = event_of(&state, &senior).await?;

    Ok(Json(SharePage {
        senior_name: senior.name,
        number_of_guests: senior.number_of_guests,
        guests: guests.into_iter().map(PublicGuest::from).collect(),
        event: event.map(TicketEvent::from),
    }))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guest = guest_by_ticket(&state, &token).await?;
    let senior = state.senior_repo.find_by_id(&guest.senior_id).await?
        .ok_or(AppError::NotFound("Senior not found".into()))?;
    let event = event_of(&state, &senior).await?;

    Ok(Json(TicketView {
        guest_name: guest.name,
        is_attended: guest.is_attended,
        attendance_time: guest.attendance_time,
        senior_name: senior.name,
        event: event.map(TicketEvent::from),
        checkin_url: checkin_url(&state, &token),
    }))
}

/// SVG QR code pointing at the auto-mark route for this ticket.
pub async fn get_ticket_qr(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guest = guest_by_ticket(&state, &token).await?;

    let url = checkin_url(&state, guest.ticket_token.as_deref().unwrap_or(&token));
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| AppError::InternalWithMsg(format!("QR encoding failed: {}", e)))?;

    let image = code.render::<svg::Color<'_>>()
        .min_dimensions(240, 240)
        .quiet_zone(true)
        .build();

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], image))
}

/// Opening a ticket's target URL checks the guest in.
pub async fn auto_checkin(
    State(state): State<Arc<AppState>>,
    caller: MaybeAuthUser,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let guest = guest_by_ticket(&state, &token).await?;
    let actor = caller.or_system();

    let outcome = state.checkin_service.auto_mark(&guest.id, &actor).await?;
    info!(guest_id = %outcome.guest().id, username = %actor.username, "Ticket opened");

    Ok(Json(outcome))
}
