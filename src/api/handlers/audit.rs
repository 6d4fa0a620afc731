use axum::{extract::{State, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{clean_optional, AuditQuery},
    responses::{page_window, Page},
};
use crate::domain::models::audit::AuditFilter;
use crate::error::AppError;
use std::sync::Arc;

pub const AUDIT_PAGE_SIZE: i64 = 20;

pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_admin()?;

    let filter = AuditFilter {
        search: clean_optional(query.search),
        entity: clean_optional(query.entity),
        action: clean_optional(query.action),
    };

    let (page, limit, offset) = page_window(query.page, AUDIT_PAGE_SIZE)?;
    let total = state.audit_repo.count(&filter).await?;
    let logs = state.audit_repo.list(&filter, limit, offset).await?;

    Ok(Json(Page::new(logs, page, AUDIT_PAGE_SIZE, total)))
}
