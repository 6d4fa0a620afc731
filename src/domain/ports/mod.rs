use crate::domain::models::{
    event::Event, senior::Senior, guest::{Guest, GuestWithContext}, user::User,
    auth::RefreshTokenRecord, audit::{AuditLog, AuditFilter}
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Event>, AppError>;
    async fn list(&self) -> Result<Vec<Event>, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait SeniorRepository: Send + Sync {
    async fn create(&self, senior: &Senior) -> Result<Senior, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Senior>, AppError>;
    async fn find_by_share_token(&self, token: &str) -> Result<Option<Senior>, AppError>;
    async fn list_by_event(&self, event_id: &str, limit: i64, offset: i64) -> Result<Vec<Senior>, AppError>;
    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError>;
    async fn list_all(&self) -> Result<Vec<Senior>, AppError>;
    async fn update(&self, senior: &Senior) -> Result<Senior, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    /// Stores `token` only if the senior has none yet; returns the row when it was written.
    async fn set_share_token_if_absent(&self, id: &str, token: &str) -> Result<Option<Senior>, AppError>;
    async fn assign_unassigned_to_event(&self, event_id: &str) -> Result<u64, AppError>;
    async fn search_in_active_events(&self, term: &str, limit: i64) -> Result<Vec<Senior>, AppError>;
}

#[async_trait]
pub trait GuestRepository: Send + Sync {
    async fn create(&self, guest: &Guest) -> Result<Guest, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Guest>, AppError>;
    async fn find_by_ticket_token(&self, token: &str) -> Result<Option<Guest>, AppError>;
    async fn list_by_senior(&self, senior_id: &str) -> Result<Vec<Guest>, AppError>;
    async fn list_with_context(&self) -> Result<Vec<GuestWithContext>, AppError>;
    async fn count_by_senior(&self, senior_id: &str) -> Result<i64, AppError>;
    async fn update_details(&self, guest: &Guest) -> Result<Guest, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    /// Writes the attendance pair atomically; `None` when the guest no longer exists.
    async fn set_attendance(&self, id: &str, is_attended: bool, attendance_time: Option<DateTime<Utc>>) -> Result<Option<Guest>, AppError>;
    async fn count_attended_by_event(&self, event_id: &str) -> Result<i64, AppError>;
    async fn set_ticket_token_if_absent(&self, id: &str, token: &str) -> Result<Option<Guest>, AppError>;
    async fn search_in_active_events(&self, term: &str, limit: i64) -> Result<Vec<GuestWithContext>, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
    /// Drops a user's expired refresh tokens; returns how many were removed.
    async fn delete_expired_for_user(&self, user_id: &str, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn record(&self, log: &AuditLog) -> Result<(), AppError>;
    async fn list(&self, filter: &AuditFilter, limit: i64, offset: i64) -> Result<Vec<AuditLog>, AppError>;
    async fn count(&self, filter: &AuditFilter) -> Result<i64, AppError>;
}
