use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const LEGACY_EVENT_NAME: &str = "Legacy Data";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub is_active: bool,

    // Ticket display overrides
    pub ticket_title: Option<String>,
    pub ticket_date_display: Option<String>,
    pub ticket_location_display: Option<String>,
    pub ticket_map_url: Option<String>,
    pub ticket_time_display: Option<String>,
    pub ticket_welcome_message: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(name: String, date: DateTime<Utc>, location: String, is_active: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            date,
            location,
            is_active,
            ticket_title: None,
            ticket_date_display: None,
            ticket_location_display: None,
            ticket_map_url: None,
            ticket_time_display: None,
            ticket_welcome_message: None,
            created_at: Utc::now(),
        }
    }

    /// Title printed on tickets, falling back to the event name.
    pub fn ticket_heading(&self) -> &str {
        self.ticket_title.as_deref().unwrap_or(&self.name)
    }
}
