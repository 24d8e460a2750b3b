use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::{classify_db_message, I18nStore};
use crate::middleware::i18n::Locale;
use crate::models::submission::SubmissionStatus;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Email is not on the allow-list")]
    EmailNotAllowed,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Account deactivated")]
    AccountDeactivated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Admin role required")]
    AdminOnly,

    #[error("User not found")]
    UserNotFound,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Cannot move submission from {from} to {to}")]
    InvalidStatusTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },

    #[error("A note is required to request a revision")]
    NoteRequired,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Cannot delete own account")]
    CannotDeleteSelf,

    #[error("Super admin account is protected")]
    SuperAdminProtected,

    #[error("An admin already exists")]
    AdminAlreadyExists,

    #[error("Invalid run token")]
    InvalidRunToken,

    #[error("Contractor role requires a contractor_id")]
    ContractorRequired,

    #[error("Fonts not found: {0}")]
    FontNotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// The response-ready form of an `AppError`, already localized.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Status code and message key, without localizing.
    pub fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "error.validation"),
            AppError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "error.validation"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "error.email_exists"),
            AppError::EmailNotAllowed => (StatusCode::FORBIDDEN, "error.email_not_allowed"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "error.invalid_credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "error.invalid_token"),
            AppError::AccountDeactivated => (StatusCode::FORBIDDEN, "error.account_deactivated"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "error.forbidden"),
            AppError::AdminOnly => (StatusCode::FORBIDDEN, "error.admin_only"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "error.user_not_found"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "error.not_found"),
            AppError::InvalidStatusTransition { .. } => {
                (StatusCode::CONFLICT, "error.invalid_transition")
            }
            AppError::NoteRequired => (StatusCode::BAD_REQUEST, "error.note_required"),
            AppError::UnknownAction(_) => (StatusCode::METHOD_NOT_ALLOWED, "error.unknown_action"),
            AppError::CannotDeleteSelf => (StatusCode::BAD_REQUEST, "error.self_delete"),
            AppError::SuperAdminProtected => (StatusCode::FORBIDDEN, "error.super_admin_protected"),
            AppError::AdminAlreadyExists => (StatusCode::CONFLICT, "error.admin_exists"),
            AppError::InvalidRunToken => (StatusCode::UNAUTHORIZED, "error.run_token"),
            AppError::ContractorRequired => (StatusCode::BAD_REQUEST, "error.contractor_required"),
            AppError::FontNotFound(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error.report_fonts"),
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "error.not_found")
            }
            AppError::DatabaseError(sqlx::Error::Database(db_err)) => {
                let key = classify_db_message(db_err.message());
                let status = match key {
                    "db.duplicate" | "db.foreign_key" => StatusCode::CONFLICT,
                    "db.check" | "db.not_null" => StatusCode::BAD_REQUEST,
                    "db.forbidden" => StatusCode::FORBIDDEN,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, key)
            }
            // decode failures are mapped to InvalidToken where they happen
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::JwtError(_)
            | AppError::BcryptError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error.internal"),
        }
    }

    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal server error: {:?}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .map(Value::String)
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            AppError::NotFound(entity) => Some(json!({ "entity": entity })),
            AppError::InvalidStatusTransition { from, to } => {
                Some(json!({ "from": from, "to": to }))
            }
            AppError::UnknownAction(action) => Some(json!({ "action": action })),
            AppError::InvalidPayload(reason) => Some(json!({ "reason": reason })),
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, key),
            details,
        }
    }
}

// Middleware and extractors reject with `AppError` directly; they answer
// in the default language.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::shared())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1, message = "required"))]
        name: String,
    }

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn maps_domain_errors_to_status_codes() {
        assert_eq!(AppError::InvalidToken.status_and_key().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AdminOnly.status_and_key().0, StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("contractor").status_and_key().0, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UnknownAction("explode".into()).status_and_key().0,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(AppError::NoteRequired.status_and_key().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status_and_key().0,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn localizes_messages() {
        let store = I18nStore::new();
        let api = AppError::NoteRequired.to_api_error(&Locale::default(), &store);
        assert_eq!(api.error, "Vui lòng nhập lý do khi yêu cầu chỉnh sửa.");

        let api = AppError::NoteRequired.to_api_error(&en(), &store);
        assert_eq!(api.error, "A note is required when requesting a revision.");
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let store = I18nStore::new();
        let errors = Named { name: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&en(), &store);

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["name"][0], "required");
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let store = I18nStore::new();
        let api = AppError::InternalServerError(anyhow::anyhow!("secret stack"))
            .to_api_error(&en(), &store);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
        assert!(api.details.is_none());
    }

    #[test]
    fn token_encoding_failure_is_a_server_fault() {
        let store = I18nStore::new();
        let err =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidKeyFormat);
        let api = AppError::JwtError(err).to_api_error(&en(), &store);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
    }
}
