// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Contractor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "profile_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Invited,
    Active,
    Deactivated,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    #[schema(example = "nhathau@example.com")]
    pub email: String,
    pub role: UserRole,
    pub contractor_id: Option<Uuid>,
    pub status: ProfileStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// The contractor this profile is confined to; `None` means unrestricted.
    pub fn contractor_scope(&self) -> Option<Uuid> {
        match self.role {
            UserRole::Admin => None,
            UserRole::Contractor => self.contractor_id,
        }
    }

    /// Whether this profile may read or write data of `contractor_id`.
    pub fn can_access_contractor(&self, contractor_id: Uuid) -> bool {
        match self.role {
            UserRole::Admin => true,
            UserRole::Contractor => self.contractor_id == Some(contractor_id),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    pub role: Option<UserRole>,
    pub contractor_id: Option<Uuid>,
    pub status: Option<ProfileStatus>,
    #[validate(length(max = 500, message = "Ghi chú quá dài."))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllowedUserEmail {
    pub email: String,
    pub role: UserRole,
    pub contractor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// --- ADMIN FUNCTIONS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    #[validate(email(message = "Email không hợp lệ."))]
    pub email: String,
    pub role: UserRole,
    #[serde(alias = "contractor_id")]
    pub contractor_id: Option<Uuid>,
    #[validate(length(max = 500, message = "Ghi chú quá dài."))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(alias = "user_id")]
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    #[serde(alias = "user_id")]
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub profile: Profile,
    /// Shown once so the admin can hand it over.
    pub temporary_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordResponse {
    pub user_id: Uuid,
    pub temporary_password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateProfileRequest {
    /// Admins may activate someone else.
    #[serde(alias = "user_id")]
    pub user_id: Option<Uuid>,
}
