// src/handlers/submissions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::RequireAdmin},
    models::submission::{
        BulkReviewPayload, BulkReviewResult, CreateSubmissionPayload, ReviewAction, ReviewPayload,
        Submission, SubmissionFilter,
    },
};

#[utoipa::path(
    get,
    path = "/api/submissions",
    tag = "Submissions",
    params(SubmissionFilter),
    responses((status = 200, description = "Newest first", body = Vec<Submission>)),
    security(("api_jwt" = []))
)]
pub async fn list_submissions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Query(filter): Query<SubmissionFilter>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let submissions = app_state
        .submission_service
        .list(&profile, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(submissions))
}

#[utoipa::path(
    post,
    path = "/api/submissions",
    tag = "Submissions",
    request_body = CreateSubmissionPayload,
    responses(
        (status = 201, description = "Batch recorded as prepared or submitted", body = Submission),
        (status = 403, description = "Not the caller's contractor")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_submission(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Json(payload): Json<CreateSubmissionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let submission = app_state
        .submission_service
        .create(&profile, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(submission)))
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    tag = "Submissions",
    params(("id" = Uuid, Path, description = "Submission id")),
    responses(
        (status = 200, description = "The submission", body = Submission),
        (status = 404, description = "Unknown or not visible")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_submission(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Submission>, ApiError> {
    let submission = app_state
        .submission_service
        .get(&profile, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(submission))
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/submit",
    tag = "Submissions",
    params(("id" = Uuid, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Now waiting for review", body = Submission),
        (status = 409, description = "Not in prepared or revision")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_submission(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Submission>, ApiError> {
    let submission = app_state
        .submission_service
        .submit(&profile, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(submission))
}

async fn review(
    app_state: &AppState,
    locale: &Locale,
    admin: RequireAdmin,
    id: Uuid,
    action: ReviewAction,
    payload: ReviewPayload,
) -> Result<Json<Submission>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(locale, &app_state.i18n_store))?;

    let submission = app_state
        .submission_service
        .review(admin.profile(), id, action, payload.note.as_deref())
        .await
        .map_err(|e| e.to_api_error(locale, &app_state.i18n_store))?;
    Ok(Json(submission))
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/approve",
    tag = "Submissions",
    params(("id" = Uuid, Path, description = "Submission id")),
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Approved", body = Submission),
        (status = 409, description = "Not waiting for review")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_submission(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewPayload>,
) -> Result<Json<Submission>, ApiError> {
    review(&app_state, &locale, admin, id, ReviewAction::Approve, payload).await
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/reject",
    tag = "Submissions",
    params(("id" = Uuid, Path, description = "Submission id")),
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Sent back for revision", body = Submission),
        (status = 400, description = "A note is required"),
        (status = 409, description = "Not waiting for review")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_submission(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewPayload>,
) -> Result<Json<Submission>, ApiError> {
    review(&app_state, &locale, admin, id, ReviewAction::Reject, payload).await
}

#[utoipa::path(
    post,
    path = "/api/submissions/bulk",
    tag = "Submissions",
    request_body = BulkReviewPayload,
    responses(
        (status = 200, description = "Ids updated and skipped", body = BulkReviewResult),
        (status = 400, description = "Empty list or missing note")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_review(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: RequireAdmin,
    Json(payload): Json<BulkReviewPayload>,
) -> Result<Json<BulkReviewResult>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .submission_service
        .bulk_review(admin.profile(), &payload.ids, payload.action, payload.note.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(result))
}
