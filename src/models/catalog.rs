// src/models/catalog.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- CONTRACTORS ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub id: Uuid,
    #[schema(example = "Công ty TNHH Xây dựng An Phát")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractorPayload {
    #[validate(length(min = 1, max = 200, message = "Tên nhà thầu là bắt buộc."))]
    pub name: String,
}

// --- DOC TYPES ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocType {
    pub id: Uuid,
    #[schema(example = "HSE-01")]
    pub code: String,
    #[schema(example = "Kế hoạch an toàn thi công")]
    pub name: String,
    #[schema(example = "Kế hoạch")]
    pub category: Option<String>,
    /// Must-have document.
    pub is_critical: bool,
    #[schema(value_type = f64, example = 1.0)]
    pub weight: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocTypePayload {
    #[validate(length(min = 1, max = 50, message = "Mã loại hồ sơ là bắt buộc."))]
    pub code: String,

    #[validate(length(min = 1, max = 200, message = "Tên loại hồ sơ là bắt buộc."))]
    pub name: String,

    pub category: Option<String>,

    #[serde(default)]
    pub is_critical: bool,

    #[schema(value_type = Option<f64>)]
    pub weight: Option<Decimal>,
}

// --- REQUIREMENTS ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractorRequirement {
    pub contractor_id: Uuid,
    pub doc_type_id: Uuid,
    #[schema(example = 3)]
    pub required_count: i32,
    pub planned_due_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequirementPayload {
    pub contractor_id: Uuid,
    pub doc_type_id: Uuid,

    #[validate(range(min = 0, max = 10000, message = "Số lượng yêu cầu không hợp lệ."))]
    pub required_count: i32,

    pub planned_due_date: Option<NaiveDate>,
}
