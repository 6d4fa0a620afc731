use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::error::AppError;
use crate::domain::models::{
    attendance::{AttendanceUpdate, GroupKey},
    event::Event,
    guest::{Guest, GuestWithContext},
    senior::Senior,
    statistics::EventAttendanceCount,
    user::User,
};

#[derive(Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        let total_pages = (total + page_size - 1) / page_size;
        Self { items, page, page_size, total, total_pages }
    }
}

/// Clamps a 1-based page number and returns (page, limit, offset).
pub fn page_window(page: Option<i64>, page_size: i64) -> Result<(i64, i64, i64), AppError> {
    let page = page.unwrap_or(1).max(1);
    let offset = (page - 1).checked_mul(page_size)
        .ok_or_else(|| AppError::Validation(format!("Page {} is out of range", page)))?;
    Ok((page, page_size, offset))
}

#[derive(Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub role: String,
    pub assigned_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            role: u.role,
            assigned_event_id: u.assigned_event_id,
            created_at: u.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct SeniorDetail {
    #[serde(flatten)]
    pub senior: Senior,
    pub guests: Vec<Guest>,
}

#[derive(Serialize)]
pub struct LegacyMigrationResult {
    pub event_id: String,
    pub moved: u64,
}

#[derive(Serialize)]
pub struct BulkTokenResult {
    pub seniors: usize,
    pub guests: usize,
}

#[derive(Serialize)]
pub struct SharePage {
    pub senior_name: String,
    pub number_of_guests: i32,
    pub guests: Vec<PublicGuest>,
    pub event: Option<TicketEvent>,
}

#[derive(Serialize)]
pub struct PublicGuest {
    pub id: String,
    pub name: String,
    pub is_attended: bool,
    pub ticket_token: Option<String>,
}

impl From<Guest> for PublicGuest {
    fn from(g: Guest) -> Self {
        Self { id: g.id, name: g.name, is_attended: g.is_attended, ticket_token: g.ticket_token }
    }
}

#[derive(Serialize)]
pub struct TicketEvent {
    pub id: String,
    pub name: String,
    pub heading: String,
    pub date: DateTime<Utc>,
    pub is_active: bool,
    pub date_display: Option<String>,
    pub location: String,
    pub location_display: Option<String>,
    pub map_url: Option<String>,
    pub time_display: Option<String>,
    pub welcome_message: Option<String>,
}

impl From<Event> for TicketEvent {
    fn from(e: Event) -> Self {
        Self {
            heading: e.ticket_heading().to_string(),
            id: e.id,
            name: e.name,
            date: e.date,
            is_active: e.is_active,
            date_display: e.ticket_date_display,
            location: e.location,
            location_display: e.ticket_location_display,
            map_url: e.ticket_map_url,
            time_display: e.ticket_time_display,
            welcome_message: e.ticket_welcome_message,
        }
    }
}

#[derive(Serialize)]
pub struct TicketView {
    pub guest_name: String,
    pub is_attended: bool,
    pub attendance_time: Option<DateTime<Utc>>,
    pub senior_name: String,
    pub event: Option<TicketEvent>,
    pub checkin_url: String,
}

#[derive(Serialize)]
pub struct SearchResults {
    pub seniors: Vec<Senior>,
    pub guests: Vec<GuestWithContext>,
}

/// Frames pushed to dashboard clients over the attendance socket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    AttendanceUpdate(AttendanceUpdate),
    Joined { group: GroupKey },
    Left { group: GroupKey },
    Snapshot { group: GroupKey, counts: Vec<EventAttendanceCount> },
    Pong,
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_clamps_and_offsets() {
        assert_eq!(page_window(None, 20).unwrap(), (1, 20, 0));
        assert_eq!(page_window(Some(-3), 20).unwrap(), (1, 20, 0));
        assert_eq!(page_window(Some(3), 12).unwrap(), (3, 12, 24));
    }

    #[test]
    fn test_page_window_rejects_overflowing_offset() {
        assert!(matches!(page_window(Some(i64::MAX), 20), Err(AppError::Validation(_))));
    }
}
