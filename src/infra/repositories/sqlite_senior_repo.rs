use crate::domain::{models::senior::Senior, ports::SeniorRepository};
use crate::error::AppError;
use crate::infra::repositories::contains_pattern;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::error;

pub struct SqliteSeniorRepo {
    pool: SqlitePool,
}

impl SqliteSeniorRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeniorRepository for SqliteSeniorRepo {
    async fn create(&self, senior: &Senior) -> Result<Senior, AppError> {
        sqlx::query_as::<_, Senior>(
            "INSERT INTO seniors (id, event_id, name, phone_number, number_of_guests, share_token, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&senior.id)
            .bind(&senior.event_id)
            .bind(&senior.name)
            .bind(&senior.phone_number)
            .bind(senior.number_of_guests)
            .bind(&senior.share_token)
            .bind(senior.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Senior>, AppError> {
        sqlx::query_as::<_, Senior>("SELECT * FROM seniors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_share_token(&self, token: &str) -> Result<Option<Senior>, AppError> {
        sqlx::query_as::<_, Senior>("SELECT * FROM seniors WHERE share_token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str, limit: i64, offset: i64) -> Result<Vec<Senior>, AppError> {
        sqlx::query_as::<_, Senior>(
            "SELECT * FROM seniors WHERE event_id = ? ORDER BY name ASC LIMIT ? OFFSET ?"
        )
            .bind(event_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM seniors WHERE event_id = ?")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<Senior>, AppError> {
        sqlx::query_as::<_, Senior>("SELECT * FROM seniors ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, senior: &Senior) -> Result<Senior, AppError> {
        sqlx::query_as::<_, Senior>(
            "UPDATE seniors SET event_id = ?, name = ?, phone_number = ?, number_of_guests = ?
             WHERE id = ? RETURNING *"
        )
            .bind(&senior.event_id)
            .bind(&senior.name)
            .bind(&senior.phone_number)
            .bind(senior.number_of_guests)
            .bind(&senior.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Senior not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM seniors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("SQLite Senior Deletion Failed: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Senior not found".into()));
        }
        Ok(())
    }

    async fn set_share_token_if_absent(&self, id: &str, token: &str) -> Result<Option<Senior>, AppError> {
        sqlx::query_as::<_, Senior>(
            "UPDATE seniors SET share_token = ? WHERE id = ? AND share_token IS NULL RETURNING *"
        )
            .bind(token)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn assign_unassigned_to_event(&self, event_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE seniors SET event_id = ? WHERE event_id IS NULL")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn search_in_active_events(&self, term: &str, limit: i64) -> Result<Vec<Senior>, AppError> {
        let pattern = contains_pattern(term);
        sqlx::query_as::<_, Senior>(
            r#"SELECT s.* FROM seniors s
               JOIN events e ON s.event_id = e.id
               WHERE e.is_active = 1
                 AND (LOWER(s.name) LIKE ? ESCAPE '\' OR s.phone_number LIKE ? ESCAPE '\')
               ORDER BY s.name ASC
               LIMIT ?"#
        )
            .bind(&pattern)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
