// src/services/admin_service.rs
//
// Privileged account operations behind /api/functions and /api/profiles.

use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProfileRepository,
    models::profile::{
        InviteRequest, InviteResponse, Profile, ProfileStatus, ResetPasswordResponse,
        UpdateProfilePayload, UserRole,
    },
    services::auth::{hash_password, normalize_email},
};

pub const TEMP_PASSWORD_LEN: usize = 12;

// No look-alike characters (0/O, 1/l/I)
const PASSWORD_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789!@#$%";

/// Random password from the thread-local CSPRNG.
pub fn generate_temp_password(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| PASSWORD_CHARSET[rng.random_range(0..PASSWORD_CHARSET.len())] as char)
        .collect()
}

/// A contractor account must point at a contractor; admins must not.
pub fn check_role_binding(
    role: UserRole,
    contractor_id: Option<Uuid>,
) -> Result<Option<Uuid>, AppError> {
    match role {
        UserRole::Contractor => contractor_id.map(Some).ok_or(AppError::ContractorRequired),
        UserRole::Admin => Ok(None),
    }
}

#[derive(Clone)]
pub struct AdminService {
    profile_repo: ProfileRepository,
    pool: PgPool,
    super_admin_email: Option<String>,
}

impl AdminService {
    pub fn new(
        profile_repo: ProfileRepository,
        pool: PgPool,
        super_admin_email: Option<String>,
    ) -> Self {
        Self {
            profile_repo,
            pool,
            super_admin_email,
        }
    }

    pub fn is_super_admin(&self, profile: &Profile) -> bool {
        self.super_admin_email
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(&profile.email))
    }

    async fn require_profile(&self, user_id: Uuid) -> Result<Profile, AppError> {
        self.profile_repo.find_profile(user_id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.profile_repo.list_profiles().await
    }

    /// manage-invite / invite: account + invited profile + allow-list entry, atomically.
    pub async fn invite(
        &self,
        admin: &Profile,
        input: &InviteRequest,
    ) -> Result<InviteResponse, AppError> {
        let email = normalize_email(&input.email);
        let contractor_id = check_role_binding(input.role, input.contractor_id)?;

        let temporary_password = generate_temp_password(TEMP_PASSWORD_LEN);
        let hashed = hash_password(&temporary_password).await?;

        let mut tx = self.pool.begin().await?;

        let user = self.profile_repo.create_user(&mut *tx, &email, &hashed).await?;
        let profile = self
            .profile_repo
            .create_profile(
                &mut *tx,
                user.id,
                &email,
                input.role,
                contractor_id,
                ProfileStatus::Invited,
                input.note.as_deref(),
            )
            .await?;
        self.profile_repo
            .upsert_allowed_email(&mut *tx, &email, input.role, contractor_id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            invited = %profile.user_id,
            by = %admin.user_id,
            role = ?profile.role,
            "User invited"
        );
        Ok(InviteResponse {
            profile,
            temporary_password,
        })
    }

    /// manage-invite / reset_password
    pub async fn reset_password(
        &self,
        admin: &Profile,
        user_id: Uuid,
    ) -> Result<ResetPasswordResponse, AppError> {
        let target = self.require_profile(user_id).await?;
        if self.is_super_admin(&target) && !self.is_super_admin(admin) {
            return Err(AppError::SuperAdminProtected);
        }

        let temporary_password = generate_temp_password(TEMP_PASSWORD_LEN);
        let hashed = hash_password(&temporary_password).await?;

        if !self.profile_repo.update_password(&self.pool, user_id, &hashed).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, by = %admin.user_id, "Password reset");
        Ok(ResetPasswordResponse {
            user_id,
            temporary_password,
        })
    }

    /// manage-users / delete_user
    pub async fn delete_user(&self, admin: &Profile, user_id: Uuid) -> Result<(), AppError> {
        if admin.user_id == user_id {
            return Err(AppError::CannotDeleteSelf);
        }
        let target = self.require_profile(user_id).await?;
        if self.is_super_admin(&target) {
            return Err(AppError::SuperAdminProtected);
        }

        if !self.profile_repo.delete_user(user_id).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::warn!(user_id = %user_id, by = %admin.user_id, "User deleted");
        Ok(())
    }

    /// invited -> active. Callers activate themselves; admins may name someone else.
    pub async fn activate_profile(
        &self,
        caller: &Profile,
        target: Option<Uuid>,
    ) -> Result<Profile, AppError> {
        let target_id = target.unwrap_or(caller.user_id);
        if target_id != caller.user_id && !caller.is_admin() {
            return Err(AppError::AdminOnly);
        }

        let profile = self.require_profile(target_id).await?;
        match profile.status {
            ProfileStatus::Active => Ok(profile),
            ProfileStatus::Deactivated => Err(AppError::AccountDeactivated),
            ProfileStatus::Invited => {
                let activated = self
                    .profile_repo
                    .set_status(target_id, ProfileStatus::Active)
                    .await?
                    .ok_or(AppError::UserNotFound)?;
                tracing::info!(user_id = %target_id, "Profile activated");
                Ok(activated)
            }
        }
    }

    /// Admin edit of role, contractor, status or note.
    pub async fn update_profile(
        &self,
        admin: &Profile,
        user_id: Uuid,
        input: &UpdateProfilePayload,
    ) -> Result<Profile, AppError> {
        let current = self.require_profile(user_id).await?;

        let demotes = input.role.is_some_and(|r| r != UserRole::Admin);
        let disables = input.status.is_some_and(|s| s != ProfileStatus::Active);
        if self.is_super_admin(&current) && (demotes || disables) {
            return Err(AppError::SuperAdminProtected);
        }

        let role = input.role.unwrap_or(current.role);
        check_role_binding(role, input.contractor_id.or(current.contractor_id))?;

        let updated = self
            .profile_repo
            .update_profile(user_id, input)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::info!(
            user_id = %user_id,
            by = %admin.user_id,
            status = ?updated.status,
            "Profile updated"
        );
        Ok(updated)
    }

    /// One-time bootstrap; refuses once any admin exists.
    pub async fn seed_first_admin(&self, email: &str, password: &str) -> Result<Profile, AppError> {
        let email = normalize_email(email);
        let hashed = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;
        self.profile_repo.lock_admin_seed(&mut *tx).await?;
        if self.profile_repo.admin_exists(&mut *tx).await? {
            return Err(AppError::AdminAlreadyExists);
        }

        let user = self.profile_repo.create_user(&mut *tx, &email, &hashed).await?;
        let profile = self
            .profile_repo
            .create_profile(
                &mut *tx,
                user.id,
                &email,
                UserRole::Admin,
                None,
                ProfileStatus::Active,
                None,
            )
            .await?;
        tx.commit().await?;

        tracing::info!(user_id = %profile.user_id, "First admin seeded");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(email: &str, role: UserRole) -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            role,
            contractor_id: None,
            status: ProfileStatus::Active,
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn temp_passwords_use_the_charset() {
        let pw = generate_temp_password(TEMP_PASSWORD_LEN);
        assert_eq!(pw.chars().count(), TEMP_PASSWORD_LEN);
        assert!(pw.bytes().all(|b| PASSWORD_CHARSET.contains(&b)));
        assert_ne!(pw, generate_temp_password(TEMP_PASSWORD_LEN));
    }

    #[test]
    fn contractor_role_needs_contractor() {
        let c = Uuid::new_v4();
        assert!(matches!(
            check_role_binding(UserRole::Contractor, None),
            Err(AppError::ContractorRequired)
        ));
        assert_eq!(check_role_binding(UserRole::Contractor, Some(c)).unwrap(), Some(c));
        assert_eq!(check_role_binding(UserRole::Admin, Some(c)).unwrap(), None);
    }

    #[tokio::test]
    async fn super_admin_matches_case_insensitively() {
        let state = crate::config::tests::lazy_state();
        let admin = &state.admin_service;
        assert!(admin.is_super_admin(&profile("Root@Example.com", UserRole::Admin)));
        assert!(!admin.is_super_admin(&profile("ops@example.com", UserRole::Admin)));
    }

    #[tokio::test]
    async fn self_delete_is_refused_before_any_query() {
        let state = crate::config::tests::lazy_state();
        let me = profile("ops@example.com", UserRole::Admin);
        let result = state.admin_service.delete_user(&me, me.user_id).await;
        assert!(matches!(result, Err(AppError::CannotDeleteSelf)));
    }

    #[tokio::test]
    async fn contractors_cannot_activate_others() {
        let state = crate::config::tests::lazy_state();
        let me = profile("nt@example.com", UserRole::Contractor);
        let result = state.admin_service.activate_profile(&me, Some(Uuid::new_v4())).await;
        assert!(matches!(result, Err(AppError::AdminOnly)));
    }
}
