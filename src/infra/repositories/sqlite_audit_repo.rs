use crate::domain::{models::audit::{AuditFilter, AuditLog}, ports::AuditRepository};
use crate::error::AppError;
use crate::infra::repositories::contains_pattern;
use async_trait::async_trait;
use sqlx::SqlitePool;

const FILTER_CLAUSE: &str = r#"
    WHERE (? IS NULL OR LOWER(username) LIKE ? ESCAPE '\' OR LOWER(details) LIKE ? ESCAPE '\' OR LOWER(entity_id) LIKE ? ESCAPE '\')
      AND (? IS NULL OR entity_name = ?)
      AND (? IS NULL OR action = ?)"#;

pub struct SqliteAuditRepo {
    pool: SqlitePool,
}

impl SqliteAuditRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn search_pattern(filter: &AuditFilter) -> Option<String> {
    filter.search.as_deref().map(contains_pattern)
}

#[async_trait]
impl AuditRepository for SqliteAuditRepo {
    async fn record(&self, log: &AuditLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO audit_logs (id, action, entity_name, entity_id, username, timestamp, details) VALUES (?, ?, ?, ?, ?, ?, ?)"
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
        let pattern = search_pattern(filter);
        let sql = format!("SELECT * FROM audit_logs {} ORDER BY timestamp DESC LIMIT ? OFFSET ?", FILTER_CLAUSE);

        sqlx::query_as::<_, AuditLog>(&sql)
            .bind(&pattern).bind(&pattern).bind(&pattern).bind(&pattern)
            .bind(&filter.entity).bind(&filter.entity)
            .bind(&filter.action).bind(&filter.action)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count(&self, filter: &AuditFilter) -> Result<i64, AppError> {
        let pattern = search_pattern(filter);
        let sql = format!("SELECT COUNT(*) FROM audit_logs {}", FILTER_CLAUSE);

        sqlx::query_scalar(&sql)
            .bind(&pattern).bind(&pattern).bind(&pattern).bind(&pattern)
            .bind(&filter.entity).bind(&filter.entity)
            .bind(&filter.action).bind(&filter.action)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
