mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use checkin_backend::domain::models::user::Role;
use common::{TestApp, ADMIN_PASSWORD};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn cookie_value(response: &axum::response::Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|c| c.starts_with(&prefix))
        .map(|c| c[prefix.len()..].split(';').next().unwrap_or_default().to_string())
}

async fn login_response(app: &TestApp, username: &str, password: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "username": username, "password": password }).to_string()))
            .unwrap()
    ).await.unwrap()
}

async fn refresh_with(app: &TestApp, refresh_token: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/refresh")
            .header(header::COOKIE, format!("refresh_token={}", refresh_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap()
}

#[tokio::test]
async fn test_login_sets_cookies_and_profile() {
    let app = TestApp::new().await;

    let response = login_response(&app, "admin", ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(cookie_value(&response, "access_token").is_some());
    assert!(cookie_value(&response, "refresh_token").is_some());

    let body = parse_body(response).await;
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "Admin");
    assert!(!body["csrf_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_are_unauthorized() {
    let app = TestApp::new().await;

    let response = login_response(&app, "admin", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = login_response(&app, "ghost", ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_seed_runs_only_once() {
    let app = TestApp::new().await;
    let again = checkin_backend::infra::factory::ensure_admin_user(&app.state).await.unwrap();
    assert!(again.is_none());
    assert_eq!(app.state.user_repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    let app = TestApp::new().await;
    let login = login_response(&app, "admin", ADMIN_PASSWORD).await;
    let first_refresh = cookie_value(&login, "refresh_token").unwrap();

    let response = refresh_with(&app, &first_refresh).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second_refresh = cookie_value(&response, "refresh_token").unwrap();
    assert_ne!(first_refresh, second_refresh);
    let body = parse_body(response).await;
    assert_eq!(body["user"]["username"], "admin");

    // Rotated token is single use
    let reused = refresh_with(&app, &first_refresh).await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);

    let response = refresh_with(&app, &second_refresh).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_refresh_family() {
    let app = TestApp::new().await;
    let login = login_response(&app, "admin", ADMIN_PASSWORD).await;
    let refresh_token = cookie_value(&login, "refresh_token").unwrap();

    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/logout")
            .header(header::COOKIE, format!("refresh_token={}", refresh_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = refresh_with(&app, &refresh_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_and_csrf_checks() {
    let app = TestApp::new().await;
    let auth = app.login_admin().await;

    let (status, _) = app.call("GET", "/api/v1/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Mutating request with the cookie but without the CSRF header
    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "name": "Sneaky", "date": chrono::Utc::now().to_rfc3339() }).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/events")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .header("X-CSRF-Token", "forged")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "name": "Sneaky", "date": chrono::Utc::now().to_rfc3339() }).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (status, _) = app.call("GET", "/api/v1/events", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_management_roles() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let event = app.seed_event("Gala", true).await;

    let (status, door) = app.call("POST", "/api/v1/users", Some(&admin), Some(json!({
        "username": "door",
        "password": "door-pass",
        "role": "User"
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(door.get("password_hash").is_none());

    let (status, _) = app.call("POST", "/api/v1/users", Some(&admin), Some(json!({
        "username": "door",
        "password": "again",
        "role": "User"
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.call("POST", "/api/v1/users", Some(&admin), Some(json!({
        "username": "viewer",
        "password": "viewer-pass",
        "role": "Senior"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call("POST", "/api/v1/users", Some(&admin), Some(json!({
        "username": "viewer",
        "password": "viewer-pass",
        "role": "Senior",
        "assigned_event_id": event.id
    }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call("POST", "/api/v1/users", Some(&admin), Some(json!({
        "username": "boss",
        "password": "x",
        "role": "Superuser"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, users) = app.call("GET", "/api/v1/users", Some(&admin), None).await;
    assert_eq!(users.as_array().unwrap().len(), 3);

    let door_auth = app.login("door", "door-pass").await;
    let (status, _) = app.call("GET", "/api/v1/users", Some(&door_auth), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call("POST", "/api/v1/events", Some(&door_auth), Some(json!({
        "name": "Not Allowed",
        "date": chrono::Utc::now().to_rfc3339()
    }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let door_id = door["id"].as_str().unwrap();
    let (status, _) = app.call("DELETE", &format!("/api/v1/users/{}", door_id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let admin_id = app.state.user_repo.find_by_username("admin").await.unwrap().unwrap().id;
    let (status, _) = app.call("DELETE", &format!("/api/v1/users/{}", admin_id), Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_senior_viewer_is_scoped_to_assigned_event() {
    let app = TestApp::new().await;
    let mine = app.seed_event("Mine", true).await;
    let theirs = app.seed_event("Theirs", true).await;
    let senior = app.seed_senior(Some(&mine.id), "Host", 1).await;
    let guest = app.seed_guest(&senior.id, "Guest").await;

    app.create_user("viewer", "viewer-pass", Role::Senior, Some(mine.id.clone())).await;
    let viewer = app.login("viewer", "viewer-pass").await;

    let (status, events) = app.call("GET", "/api/v1/events", Some(&viewer), None).await;
    assert_eq!(status, StatusCode::OK);
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], mine.id.as_str());

    let (status, _) = app.call("GET", &format!("/api/v1/events/{}", mine.id), Some(&viewer), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call("GET", &format!("/api/v1/events/{}", theirs.id), Some(&viewer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, seniors) = app.call("GET", &format!("/api/v1/events/{}/seniors", mine.id), Some(&viewer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seniors["total"], 1);

    let (status, _) = app.call("GET", &format!("/api/v1/seniors/{}", senior.id), Some(&viewer), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call("POST", &format!("/api/v1/guests/{}/mark", guest.id), Some(&viewer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call("GET", "/api/v1/search?q=host", Some(&viewer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_reports_dashboard_connections() {
    let app = TestApp::new().await;
    let (_conn, _rx) = app.state.hub.connect().await;

    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["dashboard_connections"], 1);
}
