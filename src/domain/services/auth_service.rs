use std::sync::Arc;
use crate::domain::{
    models::{auth::{Claims, RefreshTokenRecord}, user::User},
    ports::AuthRepository,
    services::tokens::generate_token,
};
use crate::error::AppError;
use crate::config::Config;
use jsonwebtoken::{encode, EncodingKey, Header, Algorithm};
use uuid::Uuid;
use chrono::{Utc, Duration};
use sha2::{Sha256, Digest};
use argon2::{password_hash::{SaltString, PasswordHash, PasswordHasher, PasswordVerifier}, Argon2};
use rand::rngs::OsRng;
use tracing::warn;

pub const TOKEN_AUDIENCE: &str = "checkin-frontend";
pub const ACCESS_TOKEN_MINUTES: i64 = 15;
pub const REFRESH_TOKEN_DAYS: i64 = 7;

/// Access JWT, raw refresh token, CSRF token.
pub type TokenPair = (String, String, String);

pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    config: Config,
    encoding_key: EncodingKey,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, config: Config) -> Self {
        let encoding_key = EncodingKey::from_ed_pem(config.jwt_secret_key.as_bytes())
            .expect("Invalid JWT Private Key PEM");

        Self { repo, config, encoding_key }
    }

    pub async fn login(&self, user: &User) -> Result<TokenPair, AppError> {
        let purged = self.repo.delete_expired_for_user(&user.id, Utc::now()).await?;
        if purged > 0 {
            tracing::debug!(user_id = %user.id, purged, "Purged expired refresh tokens");
        }

        let family_id = Uuid::new_v4();
        self.issue_token_pair(user, family_id, 1).await
    }

    /// Rotates a refresh token. The presented token is consumed; an expired
    /// one revokes its whole family.
    pub async fn refresh(&self, raw_refresh_token: &str, user: &User) -> Result<TokenPair, AppError> {
        let token_hash = self.hash_token(raw_refresh_token);

        let record = self.repo.find_refresh_token(&token_hash).await?
            .ok_or(AppError::Unauthorized)?;

        if record.expires_at < Utc::now() {
            warn!(user_id = %record.user_id, "Expired refresh token presented, revoking family");
            self.repo.delete_refresh_family(record.family_id).await?;
            return Err(AppError::Unauthorized);
        }

        self.repo.delete_refresh_token(&token_hash).await?;
        self.issue_token_pair(user, record.family_id, record.generation_id + 1).await
    }

    pub async fn logout(&self, raw_refresh_token: &str) -> Result<(), AppError> {
        let token_hash = self.hash_token(raw_refresh_token);
        match self.repo.find_refresh_token(&token_hash).await? {
            Some(record) => self.repo.delete_refresh_family(record.family_id).await,
            None => Ok(()),
        }
    }

    async fn issue_token_pair(&self, user: &User, family_id: Uuid, generation_id: i32) -> Result<TokenPair, AppError> {
        let csrf_token = generate_token(32);
        let now = Utc::now();
        let exp = (now + Duration::minutes(ACCESS_TOKEN_MINUTES)).timestamp() as usize;

        let claims = Claims {
            iss: self.config.auth_issuer.clone(),
            sub: user.id.clone(),
            aud: TOKEN_AUDIENCE.to_string(),
            exp,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            assigned_event_id: user.assigned_event_id.clone(),
            csrf_token: csrf_token.clone(),
        };

        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT encoding failed: {}", e);
                AppError::Internal
            })?;

        let refresh_token = generate_token(64);

        let refresh_record = RefreshTokenRecord {
            token_hash: self.hash_token(&refresh_token),
            user_id: user.id.clone(),
            family_id,
            generation_id,
            expires_at: now + Duration::days(REFRESH_TOKEN_DAYS),
            created_at: now,
        };

        self.repo.create_refresh_token(&refresh_record).await?;
        Ok((access_token, refresh_token, csrf_token))
    }

    pub fn hash_password(raw: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalWithMsg(format!("Password hashing failed: {}", e)))
    }

    pub fn verify_password(raw: &str, stored_hash: &str) -> Result<(), AppError> {
        let parsed_hash = PasswordHash::new(stored_hash)
            .map_err(|_| AppError::Internal)?;

        Argon2::default().verify_password(raw.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::Unauthorized)
    }

    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
