// src/handlers/profiles.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, rbac::RequireAdmin},
    models::profile::{Profile, UpdateProfilePayload},
};

#[utoipa::path(
    get,
    path = "/api/profiles",
    tag = "Profiles",
    responses(
        (status = 200, description = "All profiles, newest first", body = Vec<Profile>),
        (status = 403, description = "Admins only")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_profiles(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
) -> Result<Json<Vec<Profile>>, ApiError> {
    let profiles = app_state
        .admin_service
        .list_profiles()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(profiles))
}

#[utoipa::path(
    patch,
    path = "/api/profiles/{user_id}",
    tag = "Profiles",
    params(("user_id" = Uuid, Path, description = "User id")),
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 400, description = "Contractor role without contractor"),
        (status = 403, description = "Super admin cannot be demoted or deactivated"),
        (status = 404, description = "Unknown user")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireAdmin,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<Profile>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let profile = app_state
        .admin_service
        .update_profile(admin.profile(), user_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(profile))
}
