use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Senior {
    pub id: String,
    pub event_id: Option<String>,
    pub name: String,
    pub phone_number: Option<String>,
    pub number_of_guests: i32,
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Senior {
    pub fn new(event_id: Option<String>, name: String, phone_number: Option<String>, number_of_guests: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            name,
            phone_number,
            number_of_guests,
            share_token: None,
            created_at: Utc::now(),
        }
    }

    pub fn has_room_for_guest(&self, current_guests: i64) -> bool {
        current_guests < i64::from(self.number_of_guests)
    }
}
