use crate::domain::{models::guest::{Guest, GuestWithContext}, ports::GuestRepository};
use crate::error::AppError;
use crate::infra::repositories::contains_pattern;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

const CONTEXT_SELECT: &str = r#"
    SELECT g.id, g.name, g.phone_number, g.is_attended, g.attendance_time,
           g.senior_id, s.name AS senior_name, s.phone_number AS senior_phone_number,
           s.event_id, e.name AS event_name
    FROM guests g
    JOIN seniors s ON g.senior_id = s.id
    LEFT JOIN events e ON s.event_id = e.id"#;

pub struct SqliteGuestRepo {
    pool: SqlitePool,
}

impl SqliteGuestRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestRepository for SqliteGuestRepo {
    async fn create(&self, guest: &Guest) -> Result<Guest, AppError> {
        sqlx::query_as::<_, Guest>(
            "INSERT INTO guests (id, senior_id, name, phone_number, is_attended, attendance_time, ticket_token, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&guest.id)
            .bind(&guest.senior_id)
            .bind(&guest.name)
            .bind(&guest.phone_number)
            .bind(guest.is_attended)
            .bind(guest.attendance_time)
            .bind(&guest.ticket_token)
            .bind(guest.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Guest>, AppError> {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_ticket_token(&self, token: &str) -> Result<Option<Guest>, AppError> {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE ticket_token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_senior(&self, senior_id: &str) -> Result<Vec<Guest>, AppError> {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE senior_id = ? ORDER BY created_at ASC")
            .bind(senior_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_with_context(&self) -> Result<Vec<GuestWithContext>, AppError> {
        sqlx::query_as::<_, GuestWithContext>(CONTEXT_SELECT)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_senior(&self, senior_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM guests WHERE senior_id = ?")
            .bind(senior_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_details(&self, guest: &Guest) -> Result<Guest, AppError> {
        sqlx::query_as::<_, Guest>(
            "UPDATE guests SET name = ?, phone_number = ? WHERE id = ? RETURNING *"
        )
            .bind(&guest.name)
            .bind(&guest.phone_number)
            .bind(&guest.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Guest not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM guests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Guest not found".into()));
        }
        Ok(())
    }

    async fn set_attendance(&self, id: &str, is_attended: bool, attendance_time: Option<DateTime<Utc>>) -> Result<Option<Guest>, AppError> {
        sqlx::query_as::<_, Guest>(
            "UPDATE guests SET is_attended = ?, attendance_time = ? WHERE id = ? RETURNING *"
        )
            .bind(is_attended)
            .bind(attendance_time)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_attended_by_event(&self, event_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM guests g JOIN seniors s ON g.senior_id = s.id
             WHERE s.event_id = ? AND g.is_attended = 1"
        )
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_ticket_token_if_absent(&self, id: &str, token: &str) -> Result<Option<Guest>, AppError> {
        sqlx::query_as::<_, Guest>(
            "UPDATE guests SET ticket_token = ? WHERE id = ? AND ticket_token IS NULL RETURNING *"
        )
            .bind(token)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn search_in_active_events(&self, term: &str, limit: i64) -> Result<Vec<GuestWithContext>, AppError> {
        let pattern = contains_pattern(term);
        let sql = format!(
            "{} WHERE e.is_active = 1 AND (LOWER(g.name) LIKE ? ESCAPE '\\' OR g.phone_number LIKE ? ESCAPE '\\') ORDER BY g.name ASC LIMIT ?",
            CONTEXT_SELECT
        );
        sqlx::query_as::<_, GuestWithContext>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
