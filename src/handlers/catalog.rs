// src/handlers/catalog.rs
//
// Contractors, document types and per-contractor requirements.
// Reads are open to any signed-in user; writes need an admin.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::RequireAdmin},
    models::catalog::{
        Contractor, ContractorPayload, ContractorRequirement, DocType, DocTypePayload,
        RequirementPayload,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RequirementQuery {
    pub contractor_id: Option<Uuid>,
}

// =============================================================================
//  CONTRACTORS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/contractors",
    tag = "Catalog",
    responses(
        (status = 200, description = "Contractors visible to the caller", body = Vec<Contractor>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contractors(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
) -> Result<Json<Vec<Contractor>>, ApiError> {
    let contractors = app_state
        .catalog_repo
        .list_contractors(profile.contractor_scope())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(contractors))
}

#[utoipa::path(
    post,
    path = "/api/contractors",
    tag = "Catalog",
    request_body = ContractorPayload,
    responses(
        (status = 201, description = "Contractor created", body = Contractor),
        (status = 403, description = "Admins only")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contractor(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Json(payload): Json<ContractorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let contractor = app_state
        .catalog_repo
        .create_contractor(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(contractor)))
}

#[utoipa::path(
    put,
    path = "/api/contractors/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Contractor id")),
    request_body = ContractorPayload,
    responses(
        (status = 200, description = "Contractor renamed", body = Contractor),
        (status = 404, description = "Unknown contractor")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contractor(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContractorPayload>,
) -> Result<Json<Contractor>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let contractor = app_state
        .catalog_repo
        .update_contractor(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(contractor))
}

// =============================================================================
//  DOC TYPES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/doc-types",
    tag = "Catalog",
    responses((status = 200, description = "Document types ordered by code", body = Vec<DocType>)),
    security(("api_jwt" = []))
)]
pub async fn list_doc_types(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<DocType>>, ApiError> {
    let doc_types = app_state
        .catalog_repo
        .list_doc_types()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(doc_types))
}

#[utoipa::path(
    post,
    path = "/api/doc-types",
    tag = "Catalog",
    request_body = DocTypePayload,
    responses(
        (status = 201, description = "Document type created", body = DocType),
        (status = 409, description = "Code already used")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_doc_type(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Json(payload): Json<DocTypePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let doc_type = app_state
        .catalog_repo
        .create_doc_type(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(doc_type)))
}

#[utoipa::path(
    put,
    path = "/api/doc-types/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Document type id")),
    request_body = DocTypePayload,
    responses(
        (status = 200, description = "Document type updated", body = DocType),
        (status = 404, description = "Unknown document type")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_doc_type(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<DocTypePayload>,
) -> Result<Json<DocType>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let doc_type = app_state
        .catalog_repo
        .update_doc_type(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(doc_type))
}

// =============================================================================
//  REQUIREMENTS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/requirements",
    tag = "Catalog",
    params(RequirementQuery),
    responses(
        (
            status = 200,
            description = "Required counts and due dates",
            body = Vec<ContractorRequirement>
        )
    ),
    security(("api_jwt" = []))
)]
pub async fn list_requirements(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Query(query): Query<RequirementQuery>,
) -> Result<Json<Vec<ContractorRequirement>>, ApiError> {
    // contractors only ever see their own
    let contractor_id = profile.contractor_scope().or(query.contractor_id);

    let requirements = app_state
        .catalog_repo
        .list_requirements(contractor_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(requirements))
}

#[utoipa::path(
    put,
    path = "/api/requirements",
    tag = "Catalog",
    request_body = RequirementPayload,
    responses(
        (
            status = 200,
            description = "Requirement created or replaced",
            body = ContractorRequirement
        ),
        (status = 409, description = "Unknown contractor or document type")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_requirement(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Json(payload): Json<RequirementPayload>,
) -> Result<Json<ContractorRequirement>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let requirement = app_state
        .catalog_repo
        .upsert_requirement(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!(
        contractor_id = %requirement.contractor_id,
        doc_type_id = %requirement.doc_type_id,
        required = requirement.required_count,
        "Requirement upserted"
    );
    Ok(Json(requirement))
}

#[utoipa::path(
    delete,
    path = "/api/requirements/{contractor_id}/{doc_type_id}",
    tag = "Catalog",
    params(
        ("contractor_id" = Uuid, Path, description = "Contractor id"),
        ("doc_type_id" = Uuid, Path, description = "Document type id")
    ),
    responses(
        (status = 204, description = "Requirement removed"),
        (status = 404, description = "No such requirement")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_requirement(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path((contractor_id, doc_type_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    app_state
        .catalog_repo
        .delete_requirement(contractor_id, doc_type_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}
