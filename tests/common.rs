#![allow(dead_code)]

use checkin_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::{
        event::Event, guest::Guest, senior::Senior,
        user::{Actor, Role, User},
    },
    domain::services::auth_service::AuthService,
    infra::factory::{ensure_admin_user, sqlite_state},
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use chrono::Utc;
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::Value;

pub const ADMIN_PASSWORD: &str = "admin-test-password";

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            public_host: "http://checkin.test".to_string(),
            admin_password: Some(ADMIN_PASSWORD.to_string()),
            dashboard_buffer: 16,
        };

        let state = Arc::new(sqlite_state(pool.clone(), &config));
        ensure_admin_user(&state).await.expect("Failed to seed admin");

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> AuthHeaders {
        let payload = serde_json::json!({
            "username": username,
            "password": password
        });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token_cookie = cookies.iter()
            .find(|c| c.contains("access_token="))
            .expect("No access_token cookie returned");

        let start = access_token_cookie.find("access_token=").unwrap() + 13;
        let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
        let access_token = access_token_cookie[start..start+end].to_string();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        AuthHeaders {
            access_token,
            csrf_token
        }
    }

    pub async fn login_admin(&self) -> AuthHeaders {
        self.login("admin", ADMIN_PASSWORD).await
    }

    /// Sends a request through the router and returns the status and JSON body
    /// (`Value::Null` for empty or non-JSON bodies).
    pub async fn call(&self, method: &str, uri: &str, auth: Option<&AuthHeaders>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn create_user(&self, username: &str, password: &str, role: Role, assigned_event_id: Option<String>) -> User {
        let hash = AuthService::hash_password(password).unwrap();
        let user = User::new(username.to_string(), hash, role, assigned_event_id);
        self.state.user_repo.create(&user).await.unwrap()
    }

    pub async fn seed_event(&self, name: &str, active: bool) -> Event {
        let event = Event::new(name.to_string(), Utc::now(), "Community Hall".to_string(), active);
        self.state.event_repo.create(&event).await.unwrap()
    }

    pub async fn seed_senior(&self, event_id: Option<&str>, name: &str, quota: i32) -> Senior {
        let senior = Senior::new(event_id.map(String::from), name.to_string(), Some("0100".to_string()), quota);
        self.state.senior_repo.create(&senior).await.unwrap()
    }

    pub async fn seed_guest(&self, senior_id: &str, name: &str) -> Guest {
        let guest = Guest::new(senior_id.to_string(), name.to_string(), None);
        self.state.guest_repo.create(&guest).await.unwrap()
    }

    pub async fn set_event_active(&self, event_id: &str, active: bool) {
        let mut event = self.state.event_repo.find_by_id(event_id).await.unwrap().unwrap();
        event.is_active = active;
        self.state.event_repo.update(&event).await.unwrap();
    }

    pub async fn reload_guest(&self, guest_id: &str) -> Guest {
        self.state.guest_repo.find_by_id(guest_id).await.unwrap().expect("guest vanished")
    }
}

pub fn door_actor() -> Actor {
    Actor::authenticated("door-1".into(), "door".into(), Role::User, None)
}

pub fn admin_actor() -> Actor {
    Actor::authenticated("admin-1".into(), "admin".into(), Role::Admin, None)
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
