use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::auth::Claims;
use crate::domain::models::user::{Actor, Role};
use crate::domain::services::auth_service::TOKEN_AUDIENCE;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::Span;

/// Authenticated caller, resolved from the `access_token` cookie.
pub struct AuthUser(pub Actor);

pub(crate) fn decode_access_token(state: &AppState, token: &str) -> Result<Claims, StatusCode> {
    let decoding_key = DecodingKey::from_ed_pem(state.config.jwt_public_key.as_bytes())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_audience(&[TOKEN_AUDIENCE]);
    validation.set_issuer(&[state.config.auth_issuer.as_str()]);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| StatusCode::UNAUTHORIZED)
}

pub(crate) fn actor_from_claims(claims: Claims) -> Result<Actor, StatusCode> {
    let role: Role = claims.role.parse().map_err(|_| StatusCode::UNAUTHORIZED)?;
    Ok(Actor::authenticated(claims.sub, claims.username, role, claims.assigned_event_id))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

        let access_token = cookies.get("access_token")
            .ok_or(StatusCode::UNAUTHORIZED)?
            .value()
            .to_string();

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let claims = decode_access_token(&app_state, &access_token)?;

        let method = &parts.method;
        if method != "GET" && method != "HEAD" && method != "OPTIONS" {
            let csrf_header_val = parts.headers.get("X-CSRF-Token")
                .ok_or(StatusCode::FORBIDDEN)?
                .to_str()
                .map_err(|_| StatusCode::FORBIDDEN)?;

            if csrf_header_val != claims.csrf_token {
                return Err(StatusCode::FORBIDDEN);
            }
        }

        let actor = actor_from_claims(claims)?;

        let span = Span::current();
        if let Some(user_id) = &actor.user_id {
            span.record("user_id", user_id.as_str());
        }
        span.record("username", actor.username.as_str());

        Ok(AuthUser(actor))
    }
}
