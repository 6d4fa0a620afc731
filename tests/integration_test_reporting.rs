mod common;

use axum::http::StatusCode;
use checkin_backend::domain::models::user::Role;
use common::{door_actor, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_overview_counts_per_event() {
    let app = TestApp::new().await;
    let auth = app.login_admin().await;

    let gala = app.seed_event("Gala", true).await;
    let brunch = app.seed_event("Brunch", false).await;

    let s1 = app.seed_senior(Some(&gala.id), "Ada", 3).await;
    let g1 = app.seed_guest(&s1.id, "A1").await;
    app.seed_guest(&s1.id, "A2").await;
    let s2 = app.seed_senior(Some(&brunch.id), "Bea", 1).await;
    app.seed_guest(&s2.id, "B1").await;
    let orphan = app.seed_senior(None, "Nobody", 1).await;
    app.seed_guest(&orphan.id, "Stray").await;

    app.state.checkin_service.mark(&g1.id, &door_actor()).await.unwrap();

    let (status, overview) = app.call("GET", "/api/v1/statistics/overview", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["total_events"], 2);
    assert_eq!(overview["active_events"], 1);
    assert_eq!(overview["total_seniors"], 2);
    assert_eq!(overview["total_guests"], 3);
    assert_eq!(overview["total_attended_guests"], 1);
    assert_eq!(overview["total_pending_guests"], 2);
    assert_eq!(overview["overall_attendance_rate"], 33.3);

    let stats = overview["event_stats"].as_array().unwrap();
    let gala_stats = stats.iter().find(|s| s["event_name"] == "Gala").unwrap();
    assert_eq!(gala_stats["guests_count"], 2);
    assert_eq!(gala_stats["attended_guests"], 1);
    assert_eq!(gala_stats["attendance_rate"], 50.0);
}

#[tokio::test]
async fn test_dashboard_scoped_to_event() {
    let app = TestApp::new().await;
    let auth = app.login_admin().await;

    let gala = app.seed_event("Gala", true).await;
    let other = app.seed_event("Other", true).await;
    let s1 = app.seed_senior(Some(&gala.id), "Ada", 2).await;
    let g1 = app.seed_guest(&s1.id, "A1").await;
    let s2 = app.seed_senior(Some(&other.id), "Bea", 2).await;
    let g2 = app.seed_guest(&s2.id, "B1").await;

    app.state.checkin_service.mark(&g1.id, &door_actor()).await.unwrap();
    app.state.checkin_service.mark(&g2.id, &door_actor()).await.unwrap();

    let (status, all) = app.call("GET", "/api/v1/statistics/dashboard", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total_attended"], 2);
    assert!(all["selected_event_id"].is_null());
    assert_eq!(all["recent_activity"].as_array().unwrap().len(), 2);
    assert_eq!(all["recent_activity"][0]["time_ago"], "Just now");
    assert_eq!(all["daily_attendance"].as_array().unwrap().len(), 30);

    let (status, scoped) = app.call("GET", &format!("/api/v1/statistics/dashboard?event_id={}", gala.id), Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scoped["total_attended"], 1);
    assert_eq!(scoped["selected_event_name"], "Gala");
    assert_eq!(scoped["recent_activity"].as_array().unwrap().len(), 1);
    assert_eq!(scoped["recent_activity"][0]["guest_name"], "A1");

    let (status, _) = app.call("GET", "/api/v1/statistics/dashboard?event_id=missing", Some(&auth), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_senior_viewer_dashboard_forced_to_assigned_event() {
    let app = TestApp::new().await;

    let gala = app.seed_event("Gala", true).await;
    let other = app.seed_event("Other", true).await;
    let s = app.seed_senior(Some(&other.id), "Bea", 1).await;
    let g = app.seed_guest(&s.id, "B1").await;
    app.state.checkin_service.mark(&g.id, &door_actor()).await.unwrap();

    app.create_user("viewer", "viewer-pass", Role::Senior, Some(gala.id.clone())).await;
    let viewer = app.login("viewer", "viewer-pass").await;

    let (status, body) = app.call("GET", &format!("/api/v1/statistics/dashboard?event_id={}", other.id), Some(&viewer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_event_id"], gala.id.as_str());
    assert_eq!(body["total_attended"], 0);

    let (status, _) = app.call("GET", "/api/v1/statistics/overview", Some(&viewer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_search_matches_name_and_phone_in_active_events() {
    let app = TestApp::new().await;
    let auth = app.login_admin().await;

    let open = app.seed_event("Open", true).await;
    let closed = app.seed_event("Closed", false).await;

    let senior = app.seed_senior(Some(&open.id), "Margaret Smith", 2).await;
    app.seed_guest(&senior.id, "Tom Smithers").await;
    let hidden = app.seed_senior(Some(&closed.id), "Sally Smith", 1).await;
    app.seed_guest(&hidden.id, "Hidden Smith").await;

    let (status, results) = app.call("GET", "/api/v1/search?q=smith", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    let seniors = results["seniors"].as_array().unwrap();
    let guests = results["guests"].as_array().unwrap();
    assert_eq!(seniors.len(), 1);
    assert_eq!(seniors[0]["name"], "Margaret Smith");
    assert_eq!(guests.len(), 1);
    assert_eq!(guests[0]["senior_name"], "Margaret Smith");
    assert_eq!(guests[0]["event_name"], "Open");

    let (_, by_phone) = app.call("GET", "/api/v1/search?q=0100", Some(&auth), None).await;
    assert_eq!(by_phone["seniors"].as_array().unwrap().len(), 1);

    let (_, empty) = app.call("GET", "/api/v1/search?q=%20", Some(&auth), None).await;
    assert!(empty["seniors"].as_array().unwrap().is_empty());
    assert!(empty["guests"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_audit_log_filters_and_pagination() {
    let app = TestApp::new().await;
    let auth = app.login_admin().await;

    for i in 0..22 {
        let (status, _) = app.call("POST", "/api/v1/seniors", Some(&auth), Some(json!({
            "name": format!("Audited {:02}", i)
        }))).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, event) = app.call("POST", "/api/v1/events", Some(&auth), Some(json!({
        "name": "Audit Party",
        "date": chrono::Utc::now().to_rfc3339()
    }))).await;

    let (status, page1) = app.call("GET", "/api/v1/audit-logs", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page1["total"], 23);
    assert_eq!(page1["items"].as_array().unwrap().len(), 20);
    assert_eq!(page1["total_pages"], 2);
    assert_eq!(page1["items"][0]["entity_name"], "Event");

    let (_, by_entity) = app.call("GET", "/api/v1/audit-logs?entity=Event", Some(&auth), None).await;
    assert_eq!(by_entity["total"], 1);
    assert_eq!(by_entity["items"][0]["entity_id"], event["id"]);

    let (_, by_search) = app.call("GET", "/api/v1/audit-logs?search=audited%2007", Some(&auth), None).await;
    assert_eq!(by_search["total"], 1);

    let (_, by_action) = app.call("GET", "/api/v1/audit-logs?action=Delete", Some(&auth), None).await;
    assert_eq!(by_action["total"], 0);
}

#[tokio::test]
async fn test_audit_log_is_admin_only() {
    let app = TestApp::new().await;
    app.create_user("door", "door-pass", Role::User, None).await;
    let door = app.login("door", "door-pass").await;

    let (status, _) = app.call("GET", "/api/v1/audit-logs", Some(&door), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let app = TestApp::new().await;
    let auth = app.login_admin().await;

    let open = app.seed_event("Open", true).await;
    let senior = app.seed_senior(Some(&open.id), "Nora Vale", 1).await;
    app.seed_guest(&senior.id, "Otto Vale").await;

    let (status, percent) = app.call("GET", "/api/v1/search?q=%25", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(percent["seniors"].as_array().unwrap().is_empty());
    assert!(percent["guests"].as_array().unwrap().is_empty());

    let (_, underscore) = app.call("GET", "/api/v1/search?q=nora_vale", Some(&auth), None).await;
    assert!(underscore["seniors"].as_array().unwrap().is_empty());

    let (_, exact) = app.call("GET", "/api/v1/search?q=nora%20vale", Some(&auth), None).await;
    assert_eq!(exact["seniors"].as_array().unwrap().len(), 1);

    let (status, logs) = app.call("GET", "/api/v1/audit-logs?search=%25", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs["total"], 0);
}

#[tokio::test]
async fn test_out_of_range_page_is_rejected() {
    let app = TestApp::new().await;
    let auth = app.login_admin().await;
    let event = app.seed_event("Paged", true).await;

    let (status, _) = app.call("GET", "/api/v1/audit-logs?page=9223372036854775807", Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/events/{}/seniors?page=9223372036854775807", event.id);
    let (status, _) = app.call("GET", &uri, Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, page) = app.call("GET", "/api/v1/audit-logs?page=0", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 1);
}
