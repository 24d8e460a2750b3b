// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        dashboard::{
            ComplianceMatrix, ContractorKpi, DashboardFilter, DashboardSummary, DocProgress,
            OverdueItem, ProcessingReport, TimelineQuery,
        },
        profile::Profile,
        submission::TimelineEvent,
    },
};

// Contractor users are pinned to their own contractor whatever they ask for
fn scope(profile: &Profile, filter: &DashboardFilter) -> Option<uuid::Uuid> {
    profile.contractor_scope().or(filter.contractor_id)
}

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    params(DashboardFilter),
    responses((status = 200, description = "Totals and color counts", body = DashboardSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Query(filter): Query<DashboardFilter>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = app_state
        .dashboard_service
        .summary(scope(&profile, &filter), filter.critical_only)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/progress",
    tag = "Dashboard",
    params(DashboardFilter),
    responses(
        (
            status = 200,
            description = "Every requirement with its derived status",
            body = Vec<DocProgress>
        )
    ),
    security(("api_jwt" = []))
)]
pub async fn get_progress(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Query(filter): Query<DashboardFilter>,
) -> Result<Json<Vec<DocProgress>>, ApiError> {
    let progress = app_state
        .dashboard_service
        .progress(scope(&profile, &filter), filter.critical_only)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(progress))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/contractors",
    tag = "Dashboard",
    params(DashboardFilter),
    responses(
        (
            status = 200,
            description = "Per contractor KPIs, least complete first",
            body = Vec<ContractorKpi>
        )
    ),
    security(("api_jwt" = []))
)]
pub async fn get_contractor_kpis(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Query(filter): Query<DashboardFilter>,
) -> Result<Json<Vec<ContractorKpi>>, ApiError> {
    let kpis = app_state
        .dashboard_service
        .contractor_kpis(scope(&profile, &filter), filter.critical_only)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(kpis))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/overdue",
    tag = "Dashboard",
    params(DashboardFilter),
    responses(
        (
            status = 200,
            description = "Overdue must-have documents, most overdue first",
            body = Vec<OverdueItem>
        )
    ),
    security(("api_jwt" = []))
)]
pub async fn get_overdue(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Query(filter): Query<DashboardFilter>,
) -> Result<Json<Vec<OverdueItem>>, ApiError> {
    let items = app_state
        .dashboard_service
        .overdue(scope(&profile, &filter))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/matrix",
    tag = "Dashboard",
    params(DashboardFilter),
    responses(
        (status = 200, description = "Contractor x document type heatmap", body = ComplianceMatrix)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_matrix(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Query(filter): Query<DashboardFilter>,
) -> Result<Json<ComplianceMatrix>, ApiError> {
    let matrix = app_state
        .dashboard_service
        .matrix(scope(&profile, &filter), filter.critical_only)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(matrix))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/processing",
    tag = "Dashboard",
    params(DashboardFilter),
    responses(
        (
            status = 200,
            description = "Days from first submission to first approval",
            body = ProcessingReport
        )
    ),
    security(("api_jwt" = []))
)]
pub async fn get_processing(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Query(filter): Query<DashboardFilter>,
) -> Result<Json<ProcessingReport>, ApiError> {
    let report = app_state
        .dashboard_service
        .processing(scope(&profile, &filter))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/timeline",
    tag = "Dashboard",
    params(TimelineQuery),
    responses(
        (
            status = 200,
            description = "Submission events of one requirement, oldest first",
            body = Vec<TimelineEvent>
        ),
        (status = 403, description = "Not the caller's contractor")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_timeline(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Vec<TimelineEvent>>, ApiError> {
    if !profile.can_access_contractor(query.contractor_id) {
        return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
    }

    let events = app_state
        .dashboard_service
        .timeline(query.contractor_id, query.doc_type_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(events))
}
