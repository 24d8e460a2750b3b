// src/models/dashboard.rs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Compliance classification of one (contractor, doc type) pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Red,
    Amber,
    Neutral,
    Green,
    NotApplicable,
}

impl StatusColor {
    pub fn label_vi(&self) -> &'static str {
        match self {
            StatusColor::Red => "Quá hạn",
            StatusColor::Amber => "Sắp đến hạn",
            StatusColor::Neutral => "Đang theo dõi",
            StatusColor::Green => "Hoàn thành",
            StatusColor::NotApplicable => "Không áp dụng",
        }
    }
}

// One row of `v_doc_progress`
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocProgressRow {
    pub contractor_id: Uuid,
    pub contractor_name: String,
    pub doc_type_id: Uuid,
    pub doc_code: String,
    pub doc_name: String,
    pub category: Option<String>,
    pub is_critical: bool,
    #[schema(value_type = f64)]
    pub weight: Decimal,
    pub required_count: i32,
    pub approved_count: i64,
    pub submitted_count: i64,
    pub first_submitted_at: Option<DateTime<Utc>>,
    pub first_approved_at: Option<DateTime<Utc>>,
    pub planned_due_date: Option<NaiveDate>,
}

/// A progress row with its derived status fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocProgress {
    #[serde(flatten)]
    pub row: DocProgressRow,
    pub completion_percent: u32,
    pub status_color: StatusColor,
    pub overdue_days: Option<i64>,
    pub due_in_days: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorCounts {
    pub red: usize,
    pub amber: usize,
    pub neutral: usize,
    pub green: usize,
    pub not_applicable: usize,
}

impl ColorCounts {
    pub fn add(&mut self, color: StatusColor) {
        match color {
            StatusColor::Red => self.red += 1,
            StatusColor::Amber => self.amber += 1,
            StatusColor::Neutral => self.neutral += 1,
            StatusColor::Green => self.green += 1,
            StatusColor::NotApplicable => self.not_applicable += 1,
        }
    }
}

// Cards at the top of the dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub contractor_count: usize,
    pub required_total: i64,
    /// Capped per row at the required count.
    pub approved_total: i64,
    pub completion_percent: u32,
    pub colors: ColorCounts,
    pub overdue_critical: usize,
    pub pending_review: i64,
}

// Bar chart per contractor
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractorKpi {
    pub contractor_id: Uuid,
    pub contractor_name: String,
    pub required_total: i64,
    pub approved_total: i64,
    pub completion_percent: u32,
    pub weighted_completion_percent: u32,
    pub colors: ColorCounts,
    pub overdue_critical: usize,
}

// Must-have documents past their due date
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverdueItem {
    pub contractor_id: Uuid,
    pub contractor_name: String,
    pub doc_type_id: Uuid,
    pub doc_code: String,
    pub doc_name: String,
    pub required_count: i32,
    pub approved_count: i64,
    pub planned_due_date: Option<NaiveDate>,
    pub overdue_days: i64,
    pub suggested_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatrixDocType {
    pub doc_type_id: Uuid,
    pub code: String,
    pub name: String,
    pub is_critical: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatrixCell {
    pub doc_type_id: Uuid,
    pub status_color: StatusColor,
    pub completion_percent: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRow {
    pub contractor_id: Uuid,
    pub contractor_name: String,
    /// Aligned with `ComplianceMatrix::doc_types`; `None` where no requirement exists.
    pub cells: Vec<Option<MatrixCell>>,
}

// Heatmap: contractors x doc types
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceMatrix {
    pub doc_types: Vec<MatrixDocType>,
    pub rows: Vec<MatrixRow>,
}

/// Distribution of days from first submission to first approval.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    pub count: usize,
    pub mean_days: f64,
    pub median_days: f64,
    pub p90_days: f64,
    pub min_days: f64,
    pub max_days: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingReport {
    pub overall: Option<ProcessingStats>,
    pub by_category: BTreeMap<String, ProcessingStats>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardFilter {
    pub contractor_id: Option<Uuid>,
    /// Only must-have document types.
    #[serde(default)]
    pub critical_only: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TimelineQuery {
    pub contractor_id: Uuid,
    pub doc_type_id: Uuid,
}
