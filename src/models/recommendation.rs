// src/models/recommendation.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::dashboard::StatusColor;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    /// Restrict to one contractor; contractor users are always restricted to their own.
    #[serde(alias = "contractor_id")]
    pub contractor_id: Option<Uuid>,
}

/// A red/amber item handed to a recommendation provider.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    pub contractor_id: Uuid,
    pub contractor_name: String,
    pub doc_type_id: Uuid,
    pub doc_code: String,
    pub doc_name: String,
    pub is_critical: bool,
    pub status_color: StatusColor,
    pub completion_percent: u32,
    pub overdue_days: Option<i64>,
    pub due_in_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecommendation {
    pub contractor_id: Uuid,
    pub doc_type_id: Uuid,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Ai,
    Rules,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub source: RecommendationSource,
    /// Free-text advice from the AI provider; absent for rule-based answers.
    pub summary: Option<String>,
    pub items: Vec<ItemRecommendation>,
}
