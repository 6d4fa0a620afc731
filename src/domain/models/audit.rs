use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AuditLog {
    pub id: String,
    pub action: String,
    pub entity_name: String,
    pub entity_id: String,
    pub username: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

impl AuditLog {
    pub fn new(action: &str, entity_name: &str, entity_id: &str, username: &str, details: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            entity_name: entity_name.to_string(),
            entity_id: entity_id.to_string(),
            username: username.to_string(),
            timestamp: Utc::now(),
            details,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    pub search: Option<String>,
    pub entity: Option<String>,
    pub action: Option<String>,
}
