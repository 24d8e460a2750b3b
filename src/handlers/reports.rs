// src/handlers/reports.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

#[utoipa::path(
    get,
    path = "/api/reports/contractors/{id}",
    tag = "Reports",
    params(("id" = Uuid, Path, description = "Contractor id")),
    responses(
        (status = 200, description = "Compliance report", content_type = "application/pdf"),
        (status = 403, description = "Not the caller's contractor"),
        (status = 404, description = "Unknown contractor")
    ),
    security(("api_jwt" = []))
)]
pub async fn contractor_report(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Path(contractor_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    if !profile.can_access_contractor(contractor_id) {
        return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
    }

    let pdf_bytes = app_state
        .report_service
        .contractor_pdf(contractor_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let disposition = format!("attachment; filename=\"hse_report_{}.pdf\"", contractor_id);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf"),
        (header::CONTENT_DISPOSITION, disposition.as_str()),
    ];

    Ok((headers, pdf_bytes).into_response())
}
