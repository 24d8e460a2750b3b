// src/db/profile_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        profile::{AllowedUserEmail, Profile, ProfileStatus, UpdateProfilePayload, UserRole},
    },
};

const ADMIN_SEED_LOCK_KEY: i64 = 0x4853_455f_5345_4544;

const PROFILE_COLUMNS: &str =
    "user_id, email, role, contractor_id, status, note, created_at, updated_at";

// Accounts (`users`), their `profiles` and the registration allow-list
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    /// Transaction-scoped lock that serializes first-admin seeding.
    pub async fn lock_admin_seed<'e, E>(&self, executor: E) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMIN_SEED_LOCK_KEY)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn admin_exists<'e, E>(&self, executor: E) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM profiles WHERE role = 'admin')")
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    // Unique violation on email becomes EmailAlreadyExists
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        email: &str,
        role: UserRole,
        contractor_id: Option<Uuid>,
        status: ProfileStatus,
        note: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (user_id, email, role, contractor_id, status, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(email)
        .bind(role)
        .bind(contractor_id)
        .bind(status)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(profile)
    }

    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes the account; the profile goes with it (ON DELETE CASCADE).
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Absent fields keep their current value; note can't be cleared this way
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: &UpdateProfilePayload,
    ) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles SET
                role = COALESCE($2, role),
                contractor_id = COALESCE($3, contractor_id),
                status = COALESCE($4, status),
                note = COALESCE($5, note),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(input.role)
        .bind(input.contractor_id)
        .bind(input.status)
        .bind(input.note.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn set_status(
        &self,
        user_id: Uuid,
        status: ProfileStatus,
    ) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles SET status = $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn find_allowed_email(
        &self,
        email: &str,
    ) -> Result<Option<AllowedUserEmail>, AppError> {
        let allowed = sqlx::query_as::<_, AllowedUserEmail>(
            "SELECT email, role, contractor_id, created_at \
             FROM allowed_users_email WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(allowed)
    }

    pub async fn upsert_allowed_email<'e, E>(
        &self,
        executor: E,
        email: &str,
        role: UserRole,
        contractor_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO allowed_users_email (email, role, contractor_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (email)
            DO UPDATE SET role = EXCLUDED.role, contractor_id = EXCLUDED.contractor_id
            "#,
        )
        .bind(email)
        .bind(role)
        .bind(contractor_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}
