use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{requests::CreateUserRequest, responses::UserView};
use crate::domain::models::user::{Role, User};
use crate::domain::services::auth_service::AuthService;
use std::sync::Arc;
use crate::error::AppError;
use tracing::{info, error};

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_admin()?;

    let username = payload.username.trim().to_string();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Username and password are required".into()));
    }

    let role: Role = payload.role.parse()?;
    let assigned_event_id = match role {
        Role::Senior => {
            let event_id = payload.assigned_event_id
                .ok_or(AppError::Validation("Senior users need an assigned event".into()))?;
            state.event_repo.find_by_id(&event_id).await?
                .ok_or(AppError::NotFound("Event not found".into()))?;
            Some(event_id)
        }
        Role::Admin | Role::User => None,
    };

    if state.user_repo.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let password_hash = AuthService::hash_password(&payload.password)?;
    let user = User::new(username, password_hash, role, assigned_event_id);
    let created = state.user_repo.create(&user).await?;

    info!("Created user: {} ({})", created.id, created.role);
    state.audit_service.log(
        "Create", "User", &created.id, &actor,
        format!("Created user '{}' with role {}", created.username, created.role),
    ).await;

    Ok(Json(UserView::from(created)))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_admin()?;

    let users: Vec<UserView> = state.user_repo.list().await?
        .into_iter()
        .map(UserView::from)
        .collect();

    Ok(Json(users))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.ensure_admin()?;

    if actor.user_id.as_deref() == Some(user_id.as_str()) {
        return Err(AppError::Conflict("Cannot delete yourself".into()));
    }

    let target = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    match state.user_repo.delete(&target.id).await {
        Ok(_) => {
            info!("Deleted user {}", user_id);
            state.audit_service.log(
                "Delete", "User", &target.id, &actor,
                format!("Deleted user '{}'", target.username),
            ).await;
            Ok(Json(serde_json::json!({"status": "deleted"})))
        },
        Err(e) => {
            error!("Failed to delete user {}: {:?}", user_id, e);
            Err(e)
        }
    }
}
