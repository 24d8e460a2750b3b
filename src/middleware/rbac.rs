// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::profile::{Profile, UserRole},
};

/// A role a route can demand.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> UserRole;
}

/// Guard extractor: the authenticated caller holds role `T`.
pub struct RequireRole<T>(pub Profile, PhantomData<T>);

impl<T> RequireRole<T> {
    pub fn profile(&self) -> &Profile {
        &self.0
    }
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        let AuthenticatedUser(profile) = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        if profile.role != T::role() {
            let err = match T::role() {
                UserRole::Admin => AppError::AdminOnly,
                UserRole::Contractor => AppError::Forbidden,
            };
            return Err(err.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(profile, PhantomData))
    }
}

pub struct AdminRole;
impl RoleDef for AdminRole {
    fn role() -> UserRole {
        UserRole::Admin
    }
}

pub type RequireAdmin = RequireRole<AdminRole>;
