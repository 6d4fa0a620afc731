use crate::domain::{models::audit::{AuditFilter, AuditLog}, ports::AuditRepository};
use crate::error::AppError;
use crate::infra::repositories::contains_pattern;
use async_trait::async_trait;
use sqlx::PgPool;

const FILTER_CLAUSE: &str = r#"
    WHERE ($1::TEXT IS NULL OR LOWER(username) LIKE $1 ESCAPE '\' OR LOWER(details) LIKE $1 ESCAPE '\' OR LOWER(entity_id) LIKE $1 ESCAPE '\')
      AND ($2::TEXT IS NULL OR entity_name = $2)
      AND ($3::TEXT IS NULL OR action = $3)"#;

pub struct PostgresAuditRepo {
    pool: PgPool,
}

impl PostgresAuditRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn search_pattern(filter: &AuditFilter) -> Option<String> {
    filter.search.as_deref().map(contains_pattern)
}

#[async_trait]
impl AuditRepository for PostgresAuditRepo {
    async fn record(&self, log: &AuditLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO audit_logs (id, action, entity_name, entity_id, username, timestamp, details) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        )
            .bind(&log.id)
            .bind(&log.action)
            .bind(&log.entity_name)
            .bind(&log.entity_id)
            .bind(&log.username)
            .bind(log.timestamp)
            .bind(&log.details)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list(&self, filter: &AuditFilter, limit: i64, offset: i64) -> Result<Vec<AuditLog>, AppError> {
        let sql = format!("SELECT * FROM audit_logs {} ORDER BY timestamp DESC LIMIT $4 OFFSET $5", FILTER_CLAUSE);

        sqlx::query_as::<_, AuditLog>(&sql)
            .bind(search_pattern(filter))
            .bind(&filter.entity)
            .bind(&filter.action)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count(&self, filter: &AuditFilter) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM audit_logs {}", FILTER_CLAUSE);

        sqlx::query_scalar(&sql)
            .bind(search_pattern(filter))
            .bind(&filter.entity)
            .bind(&filter.action)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
