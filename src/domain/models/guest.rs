use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Guest {
    pub id: String,
    pub senior_id: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub is_attended: bool,
    pub attendance_time: Option<DateTime<Utc>>,
    pub ticket_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Guest {
    pub fn new(senior_id: String, name: String, phone_number: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            senior_id,
            name,
            phone_number,
            is_attended: false,
            attendance_time: None,
            ticket_token: None,
            created_at: Utc::now(),
        }
    }
}

/// Guest row joined with its senior and event, used by search and the dashboard feed.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct GuestWithContext {
    pub id: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub is_attended: bool,
    pub attendance_time: Option<DateTime<Utc>>,
    pub senior_id: String,
    pub senior_name: String,
    pub senior_phone_number: Option<String>,
    pub event_id: Option<String>,
    pub event_name: Option<String>,
}
