// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProfileRepository,
    models::{
        auth::Claims,
        profile::{Profile, ProfileStatus},
    },
};

const TOKEN_TTL_DAYS: i64 = 7;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// bcrypt is CPU bound; keep it off the async workers
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Hashing task failed: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    profile_repo: ProfileRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(profile_repo: ProfileRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self {
            profile_repo,
            jwt_secret,
            pool,
        }
    }

    /// Self-registration for emails on the allow-list. The profile starts active.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, Profile), AppError> {
        let email = normalize_email(email);

        // 1. The allow-list decides role and contractor
        let allowed = self
            .profile_repo
            .find_allowed_email(&email)
            .await?
            .ok_or(AppError::EmailNotAllowed)?;

        // 2. Hash outside the transaction
        let hashed_password = hash_password(password).await?;

        // 3. Account + profile atomically
        let mut tx = self.pool.begin().await?;

        let user = self.profile_repo.create_user(&mut *tx, &email, &hashed_password).await?;
        let profile = self
            .profile_repo
            .create_profile(
                &mut *tx,
                user.id,
                &email,
                allowed.role,
                allowed.contractor_id,
                ProfileStatus::Active,
                None,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, role = ?profile.role, "User registered from allow-list");

        let token = self.create_token(user.id)?;
        Ok((token, profile))
    }

    pub async fn login_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, Profile), AppError> {
        let email = normalize_email(email);
        let user = self
            .profile_repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let profile = self
            .profile_repo
            .find_profile(user.id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if profile.status == ProfileStatus::Deactivated {
            return Err(AppError::AccountDeactivated);
        }

        let token = self.create_token(user.id)?;
        Ok((token, profile))
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    /// Token -> profile; deactivated profiles are refused.
    pub async fn validate_token(&self, token: &str) -> Result<Profile, AppError> {
        let claims = self.decode_token(token)?;

        let profile = self
            .profile_repo
            .find_profile(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if profile.status == ProfileStatus::Deactivated {
            return Err(AppError::AccountDeactivated);
        }
        Ok(profile)
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
