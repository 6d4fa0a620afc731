use chrono::{DateTime, Utc};
use serde::Deserialize;
use crate::domain::models::attendance::GroupKey;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: String,
    pub assigned_event_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    pub is_active: Option<bool>,
    pub ticket_title: Option<String>,
    pub ticket_date_display: Option<String>,
    pub ticket_location_display: Option<String>,
    pub ticket_map_url: Option<String>,
    pub ticket_time_display: Option<String>,
    pub ticket_welcome_message: Option<String>,
}

/// Partial update. For ticket overrides an empty string clears the field.
#[derive(Deserialize, Default)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
    pub ticket_title: Option<String>,
    pub ticket_date_display: Option<String>,
    pub ticket_location_display: Option<String>,
    pub ticket_map_url: Option<String>,
    pub ticket_time_display: Option<String>,
    pub ticket_welcome_message: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateSeniorRequest {
    pub event_id: Option<String>,
    pub name: String,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub number_of_guests: i32,
}

#[derive(Deserialize)]
pub struct UpdateSeniorRequest {
    pub event_id: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub number_of_guests: Option<i32>,
}

#[derive(Deserialize)]
pub struct CreateGuestRequest {
    pub name: String,
    pub phone_number: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateGuestRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

#[derive(Deserialize)]
pub struct AuditQuery {
    pub search: Option<String>,
    pub entity: Option<String>,
    pub action: Option<String>,
    pub page: Option<i64>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct EventScopeQuery {
    pub event_id: Option<String>,
}

/// Frames a dashboard client may send over the attendance socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Join { group: GroupKey },
    Leave { group: GroupKey },
    Ping,
}

/// Trims and drops blank optional text.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
