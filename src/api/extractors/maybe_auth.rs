use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::user::Actor;
use super::auth::{actor_from_claims, decode_access_token};
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::debug;

/// Caller identity when present. Public ticket routes use it to attribute
/// audit entries; a missing or invalid token is not an error here.
pub struct MaybeAuthUser(pub Option<Actor>);

impl MaybeAuthUser {
    pub fn or_system(self) -> Actor {
        self.0.unwrap_or_else(Actor::system)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(cookies) = parts.extensions.get::<Cookies>() else {
            return Ok(MaybeAuthUser(None));
        };

        let access_token = match cookies.get("access_token") {
            Some(cookie) => cookie.value().to_string(),
            None => return Ok(MaybeAuthUser(None)),
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        match decode_access_token(&app_state, &access_token).and_then(actor_from_claims) {
            Ok(actor) => Ok(MaybeAuthUser(Some(actor))),
            Err(_) => {
                // Expired or tampered token: treat as anonymous
                debug!("MaybeAuth: ignoring invalid access token");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}
