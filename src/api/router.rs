use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{
    attendance, audit, auth, dashboard, event, guest, health, public, senior, statistics, users,
};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Users (Admin)
        .route("/api/v1/users", get(users::list_users).post(users::create_user))
        .route("/api/v1/users/{user_id}", delete(users::delete_user))

        // Events
        .route("/api/v1/events", get(event::list_events).post(event::create_event))
        .route("/api/v1/events/migrate-legacy", post(event::migrate_legacy))
        .route("/api/v1/events/{event_id}", get(event::get_event).put(event::update_event).delete(event::delete_event))
        .route("/api/v1/events/{event_id}/seniors", get(event::list_event_seniors))
        .route("/api/v1/events/{event_id}/share-tokens", post(event::generate_event_tokens))

        // Seniors & Guests
        .route("/api/v1/seniors", post(senior::create_senior))
        .route("/api/v1/seniors/{senior_id}", get(senior::get_senior).put(senior::update_senior).delete(senior::delete_senior))
        .route("/api/v1/seniors/{senior_id}/guests", post(senior::add_guest))
        .route("/api/v1/seniors/{senior_id}/share-token", post(senior::generate_share_token))
        .route("/api/v1/guests/{guest_id}", put(guest::update_guest).delete(guest::delete_guest))
        .route("/api/v1/guests/{guest_id}/ticket-token", post(guest::generate_ticket_token))

        // Check-in
        .route("/api/v1/guests/{guest_id}/mark", post(attendance::mark_guest))
        .route("/api/v1/guests/{guest_id}/unmark", post(attendance::unmark_guest))

        // Public token routes
        .route("/api/v1/share/{token}", get(public::get_share_page))
        .route("/api/v1/tickets/{token}", get(public::get_ticket))
        .route("/api/v1/tickets/{token}/qr", get(public::get_ticket_qr))
        .route("/api/v1/checkin/{token}", get(public::auto_checkin))

        // Live dashboard
        .route("/api/v1/ws/attendance", get(dashboard::attendance_socket))

        // Reporting
        .route("/api/v1/statistics/overview", get(statistics::overview))
        .route("/api/v1/statistics/dashboard", get(statistics::dashboard))
        .route("/api/v1/search", get(statistics::search))
        .route("/api/v1/audit-logs", get(audit::list_audit_logs))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                        username = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
