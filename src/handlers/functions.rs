// src/handlers/functions.rs
//
// Admin functions: one privileged operation per endpoint. The action-based
// endpoints dispatch on the `action` field of the JSON body.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::RequireAdmin},
    models::{
        profile::{
            ActivateProfileRequest, DeleteUserRequest, InviteRequest, InviteResponse, Profile,
            ResetPasswordRequest, ResetPasswordResponse,
        },
        recommendation::{RecommendationRequest, RecommendationResponse},
    },
};

pub const RUN_TOKEN_HEADER: &str = "x-run-token";

/// Empty body -> `T::default()`.
pub fn parse_optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::InvalidPayload(e.to_string()))
}

/// The `action` field and the body it came with.
pub fn split_action(body: &[u8]) -> Result<(String, Value), AppError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| AppError::InvalidPayload(e.to_string()))?;
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Ok((action, value))
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|e| AppError::InvalidPayload(e.to_string()))
}

#[utoipa::path(
    post,
    path = "/api/functions/activate-profile",
    tag = "Functions",
    request_body(
        content = ActivateProfileRequest,
        description = "Optional; admins may name another user"
    ),
    responses(
        (status = 200, description = "Profile is active", body = Profile),
        (status = 403, description = "Deactivated, or not an admin activating someone else")
    ),
    security(("api_jwt" = []))
)]
pub async fn activate_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    body: Bytes,
) -> Result<Json<Profile>, ApiError> {
    let request: ActivateProfileRequest =
        parse_optional_body(&body).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let profile = app_state
        .admin_service
        .activate_profile(&caller, request.user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(profile))
}

#[utoipa::path(
    post,
    path = "/api/functions/manage-invite",
    tag = "Functions",
    request_body(
        content = Object,
        description = "`{action: \"invite\", email, role, contractorId?, note?}` \
                       or `{action: \"reset_password\", userId}`"
    ),
    responses(
        (status = 201, description = "User invited", body = InviteResponse),
        (status = 200, description = "Password reset", body = ResetPasswordResponse),
        (status = 405, description = "Unknown action"),
        (status = 409, description = "Email already registered")
    ),
    security(("api_jwt" = []))
)]
pub async fn manage_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireAdmin,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let (action, value) = split_action(&body).map_err(to_api)?;
    match action.as_str() {
        "invite" => {
            let request: InviteRequest = from_value(value).map_err(to_api)?;
            request.validate().map_err(|e| to_api(AppError::ValidationError(e)))?;

            let response = app_state
                .admin_service
                .invite(admin.profile(), &request)
                .await
                .map_err(to_api)?;
            Ok((StatusCode::CREATED, Json(json!(response))))
        }
        "reset_password" => {
            let request: ResetPasswordRequest = from_value(value).map_err(to_api)?;

            let response = app_state
                .admin_service
                .reset_password(admin.profile(), request.user_id)
                .await
                .map_err(to_api)?;
            Ok((StatusCode::OK, Json(json!(response))))
        }
        _ => Err(to_api(AppError::UnknownAction(action))),
    }
}

#[utoipa::path(
    post,
    path = "/api/functions/manage-users",
    tag = "Functions",
    request_body(content = Object, description = "`{action: \"delete_user\", userId}`"),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Cannot delete yourself"),
        (status = 403, description = "Super admin is protected"),
        (status = 405, description = "Unknown action")
    ),
    security(("api_jwt" = []))
)]
pub async fn manage_users(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireAdmin,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let (action, value) = split_action(&body).map_err(to_api)?;
    match action.as_str() {
        "delete_user" => {
            let request: DeleteUserRequest = from_value(value).map_err(to_api)?;
            app_state
                .admin_service
                .delete_user(admin.profile(), request.user_id)
                .await
                .map_err(to_api)?;
            Ok(Json(json!({ "ok": true, "userId": request.user_id })))
        }
        _ => Err(to_api(AppError::UnknownAction(action))),
    }
}

#[utoipa::path(
    post,
    path = "/api/functions/ai-recommendations",
    tag = "Functions",
    request_body(content = RecommendationRequest, description = "Optional contractor filter"),
    responses(
        (
            status = 200,
            description = "Advice and which source produced it",
            body = RecommendationResponse
        )
    ),
    security(("api_jwt" = []))
)]
pub async fn ai_recommendations(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    body: Bytes,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let request: RecommendationRequest =
        parse_optional_body(&body).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let scope = profile.contractor_scope().or(request.contractor_id);
    let response = app_state
        .recommendation_service
        .recommend(scope)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/functions/seed-first-admin",
    tag = "Functions",
    params(("x-run-token" = String, Header, description = "Must equal RUN_TOKEN")),
    responses(
        (
            status = 201,
            description = "Admin created from ADMIN_EMAIL / ADMIN_PASSWORD",
            body = Profile
        ),
        (status = 401, description = "Missing or wrong run token"),
        (status = 409, description = "An admin already exists")
    )
)]
pub async fn seed_first_admin(
    State(app_state): State<AppState>,
    locale: Locale,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    // disabled entirely when RUN_TOKEN is unset
    let provided = headers.get(RUN_TOKEN_HEADER).and_then(|v| v.to_str().ok());
    match (app_state.config.run_token.as_deref(), provided) {
        (Some(expected), Some(provided)) if expected == provided => {}
        _ => return Err(to_api(AppError::InvalidRunToken)),
    }

    let (Some(email), Some(password)) = (
        app_state.config.admin_email.as_deref(),
        app_state.config.admin_password.as_deref(),
    ) else {
        return Err(to_api(AppError::InternalServerError(anyhow::anyhow!(
            "ADMIN_EMAIL and ADMIN_PASSWORD must be set to seed the first admin"
        ))));
    };

    let profile = app_state
        .admin_service
        .seed_first_admin(email, password)
        .await
        .map_err(to_api)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn empty_body_means_defaults() {
        let request: ActivateProfileRequest = parse_optional_body(b"").unwrap();
        assert!(request.user_id.is_none());
        let request: ActivateProfileRequest = parse_optional_body(b"  \n").unwrap();
        assert!(request.user_id.is_none());
    }

    #[test]
    fn optional_body_is_parsed_when_present() {
        let id = Uuid::new_v4();
        let body = format!("{{\"userId\": \"{id}\"}}");
        let request: ActivateProfileRequest = parse_optional_body(body.as_bytes()).unwrap();
        assert_eq!(request.user_id, Some(id));

        let bad: Result<ActivateProfileRequest, _> = parse_optional_body(b"{not json");
        assert!(matches!(bad, Err(AppError::InvalidPayload(_))));
    }

    #[test]
    fn action_is_read_from_body() {
        let (action, value) = split_action(br#"{"action":"reset_password","userId":"x"}"#).unwrap();
        assert_eq!(action, "reset_password");
        assert_eq!(value["userId"], "x");

        let (action, _) = split_action(br#"{"userId":"x"}"#).unwrap();
        assert_eq!(action, "");
    }

    #[test]
    fn action_payloads_ignore_the_action_field() {
        let id = Uuid::new_v4();
        let value = json!({ "action": "delete_user", "userId": id });
        let request: DeleteUserRequest = from_value(value).unwrap();
        assert_eq!(request.user_id, id);

        let missing: Result<DeleteUserRequest, _> = from_value(json!({ "action": "delete_user" }));
        assert!(matches!(missing, Err(AppError::InvalidPayload(_))));
    }

    #[test]
    fn snake_case_ids_are_accepted() {
        let id = Uuid::new_v4();

        let request: DeleteUserRequest =
            from_value(json!({ "action": "delete_user", "user_id": id })).unwrap();
        assert_eq!(request.user_id, id);

        let request: ResetPasswordRequest = from_value(json!({ "user_id": id })).unwrap();
        assert_eq!(request.user_id, id);

        let body = format!("{{\"user_id\": \"{id}\"}}");
        let request: ActivateProfileRequest = parse_optional_body(body.as_bytes()).unwrap();
        assert_eq!(request.user_id, Some(id));

        let body = format!("{{\"contractor_id\": \"{id}\"}}");
        let request: RecommendationRequest = parse_optional_body(body.as_bytes()).unwrap();
        assert_eq!(request.contractor_id, Some(id));

        let request: InviteRequest = from_value(json!({
            "action": "invite",
            "email": "an@example.com",
            "role": "contractor",
            "contractor_id": id,
        }))
        .unwrap();
        assert_eq!(request.contractor_id, Some(id));
    }
}
