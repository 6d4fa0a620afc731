use crate::domain::{models::event::Event, ports::EventRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            r#"INSERT INTO events (
                id, name, date, location, is_active,
                ticket_title, ticket_date_display, ticket_location_display,
                ticket_map_url, ticket_time_display, ticket_welcome_message, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *"#
        )
            .bind(&event.id)
            .bind(&event.name)
            .bind(event.date)
            .bind(&event.location)
            .bind(event.is_active)
            .bind(&event.ticket_title)
            .bind(&event.ticket_date_display)
            .bind(&event.ticket_location_display)
            .bind(&event.ticket_map_url)
            .bind(&event.ticket_time_display)
            .bind(&event.ticket_welcome_message)
            .bind(event.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE name = $1 LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY date DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            r#"UPDATE events SET
                name = $1, date = $2, location = $3, is_active = $4,
                ticket_title = $5, ticket_date_display = $6, ticket_location_display = $7,
                ticket_map_url = $8, ticket_time_display = $9, ticket_welcome_message = $10
            WHERE id = $11
            RETURNING *"#
        )
            .bind(&event.name)
            .bind(event.date)
            .bind(&event.location)
            .bind(event.is_active)
            .bind(&event.ticket_title)
            .bind(&event.ticket_date_display)
            .bind(&event.ticket_location_display)
            .bind(&event.ticket_map_url)
            .bind(&event.ticket_time_display)
            .bind(&event.ticket_welcome_message)
            .bind(&event.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Event not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }
}
