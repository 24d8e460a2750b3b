// src/services/recommendation_service.rs
//
// Advice for red/amber items: an OpenAI-compatible chat endpoint when one is
// configured, the canned suggestion rules otherwise or when it fails.

use std::{collections::HashSet, sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AiConfig,
    models::{
        dashboard::{DocProgress, StatusColor},
        recommendation::{
            ItemRecommendation, RecommendationResponse, RecommendationSource, RiskItem,
        },
    },
    services::{dashboard_service::DashboardService, suggestions::suggest_for},
};

/// Upper bound on items sent to the provider.
pub const MAX_RISK_ITEMS: usize = 40;

const SYSTEM_PROMPT: &str = "Bạn là chuyên gia HSE (an toàn, sức khỏe, môi trường) \
    trên công trường. Dựa trên danh sách hồ sơ nhà thầu đang trễ hoặc sắp đến hạn, \
    hãy đề xuất hành động cụ thể bằng tiếng Việt. Trả lời bằng JSON: \
    {\"summary\": string, \"items\": [{\"contractorId\": uuid, \"docTypeId\": uuid, \
    \"actions\": [string]}]}.";

#[derive(Debug, Clone)]
pub struct AiAdvice {
    pub summary: Option<String>,
    pub items: Vec<ItemRecommendation>,
}

#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn recommend(&self, items: &[RiskItem]) -> anyhow::Result<AiAdvice>;
}

// --- OpenAI-compatible chat completions ---

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdviceWire {
    summary: Option<String>,
    #[serde(default)]
    items: Vec<ItemWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemWire {
    contractor_id: Uuid,
    doc_type_id: Uuid,
    #[serde(default)]
    actions: Vec<String>,
}

/// Parses the model's JSON answer into advice.
pub fn parse_advice(content: &str) -> anyhow::Result<AiAdvice> {
    // some models wrap JSON in a fenced block
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let wire: AdviceWire =
        serde_json::from_str(trimmed).context("AI answer is not the expected JSON")?;
    Ok(AiAdvice {
        summary: wire.summary.filter(|s| !s.trim().is_empty()),
        items: wire
            .items
            .into_iter()
            .filter(|i| !i.actions.is_empty())
            .map(|i| ItemRecommendation {
                contractor_id: i.contractor_id,
                doc_type_id: i.doc_type_id,
                actions: i.actions,
            })
            .collect(),
    })
}

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &AiConfig) -> anyhow::Result<Self> {
        let api_key = config.api_key.clone().context("AI_API_KEY is not set")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl RecommendationProvider for OpenAiProvider {
    async fn recommend(&self, items: &[RiskItem]) -> anyhow::Result<AiAdvice> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: serde_json::to_string(items)?,
                },
            ],
            temperature: 0.2,
            response_format: serde_json::json!({ "type": "json_object" }),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("AI request failed")?
            .error_for_status()
            .context("AI provider returned an error status")?;

        let body: ChatResponse = response.json().await.context("AI response is not valid JSON")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("AI response has no content")?;

        parse_advice(&content)
    }
}

// --- Rules ---

fn is_at_risk(p: &DocProgress) -> bool {
    matches!(p.status_color, StatusColor::Red | StatusColor::Amber)
}

/// Red before amber, then most overdue, then soonest due.
pub fn risk_items(progress: &[DocProgress]) -> Vec<RiskItem> {
    let mut at_risk: Vec<&DocProgress> = progress.iter().filter(|p| is_at_risk(p)).collect();
    at_risk.sort_by_key(|p| {
        (
            p.status_color,
            std::cmp::Reverse(p.overdue_days.unwrap_or(0)),
            p.due_in_days.unwrap_or(i64::MAX),
        )
    });

    at_risk
        .into_iter()
        .take(MAX_RISK_ITEMS)
        .map(|p| RiskItem {
            contractor_id: p.row.contractor_id,
            contractor_name: p.row.contractor_name.clone(),
            doc_type_id: p.row.doc_type_id,
            doc_code: p.row.doc_code.clone(),
            doc_name: p.row.doc_name.clone(),
            is_critical: p.row.is_critical,
            status_color: p.status_color,
            completion_percent: p.completion_percent,
            overdue_days: p.overdue_days,
            due_in_days: p.due_in_days,
        })
        .collect()
}

pub fn rule_recommendations(progress: &[DocProgress]) -> Vec<ItemRecommendation> {
    let selected: HashSet<(Uuid, Uuid)> = risk_items(progress)
        .iter()
        .map(|r| (r.contractor_id, r.doc_type_id))
        .collect();

    let mut items: Vec<(&DocProgress, ItemRecommendation)> = progress
        .iter()
        .filter(|p| selected.contains(&(p.row.contractor_id, p.row.doc_type_id)))
        .map(|p| {
            (p, ItemRecommendation {
                contractor_id: p.row.contractor_id,
                doc_type_id: p.row.doc_type_id,
                actions: suggest_for(p),
            })
        })
        .collect();
    items.sort_by_key(|(p, _)| (p.status_color, std::cmp::Reverse(p.overdue_days.unwrap_or(0))));
    items.into_iter().map(|(_, item)| item).collect()
}

#[derive(Clone)]
pub struct RecommendationService {
    dashboard: DashboardService,
    provider: Option<Arc<dyn RecommendationProvider>>,
}

impl RecommendationService {
    pub fn new<P>(dashboard: DashboardService, provider: Option<P>) -> Self
    where
        P: RecommendationProvider + 'static,
    {
        Self {
            dashboard,
            provider: provider.map(|p| Arc::new(p) as Arc<dyn RecommendationProvider>),
        }
    }

    pub async fn recommend(&self, scope: Option<Uuid>) -> Result<RecommendationResponse, AppError> {
        let progress = self.dashboard.progress(scope, false).await?;
        Ok(self.resolve(&progress).await)
    }

    /// Asks the provider, falling back to rules on absence, failure or an empty answer.
    pub async fn resolve(&self, progress: &[DocProgress]) -> RecommendationResponse {
        let risks = risk_items(progress);

        if let (Some(provider), false) = (&self.provider, risks.is_empty()) {
            match provider.recommend(&risks).await {
                Ok(advice) => {
                    // only keep answers about the items we asked for
                    let asked: HashSet<(Uuid, Uuid)> =
                        risks.iter().map(|r| (r.contractor_id, r.doc_type_id)).collect();
                    let items: Vec<ItemRecommendation> = advice
                        .items
                        .into_iter()
                        .filter(|i| asked.contains(&(i.contractor_id, i.doc_type_id)))
                        .collect();

                    if !items.is_empty() || advice.summary.is_some() {
                        let items = if items.is_empty() {
                            rule_recommendations(progress)
                        } else {
                            items
                        };
                        return RecommendationResponse {
                            source: RecommendationSource::Ai,
                            summary: advice.summary,
                            items,
                        };
                    }
                    tracing::warn!("AI provider returned an empty answer, using rules");
                }
                Err(e) => tracing::warn!(error = %e, "AI provider failed, using rules"),
            }
        }

        RecommendationResponse {
            source: RecommendationSource::Rules,
            summary: None,
            items: rule_recommendations(progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::lazy_state;
    use crate::services::status::{
        derive,
        tests::{at, day, row},
        StatusPolicy,
    };

    fn progress() -> Vec<DocProgress> {
        let now = at(2024, 1, 20);
        let policy = StatusPolicy::default();
        let mut rows = vec![
            row(3, 1, Some(day(2024, 1, 1)), true),   // red, 19 days overdue
            row(2, 0, Some(day(2024, 1, 24)), false), // amber
            row(2, 2, Some(day(2024, 1, 1)), true),   // green
            row(1, 0, None, false),                   // neutral
            row(3, 0, Some(day(2024, 1, 15)), true),  // red, 5 days overdue
        ];
        for r in rows.iter_mut() {
            r.doc_type_id = Uuid::new_v4();
        }
        rows.into_iter().map(|r| derive(r, now, &policy)).collect()
    }

    struct FixedProvider(anyhow::Result<AiAdvice>);

    #[async_trait]
    impl RecommendationProvider for FixedProvider {
        async fn recommend(&self, _items: &[RiskItem]) -> anyhow::Result<AiAdvice> {
            match &self.0 {
                Ok(advice) => Ok(advice.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    #[test]
    fn risk_items_are_red_first_then_most_overdue() {
        let items = risk_items(&progress());
        let colors: Vec<StatusColor> = items.iter().map(|i| i.status_color).collect();
        assert_eq!(colors, vec![StatusColor::Red, StatusColor::Red, StatusColor::Amber]);
        assert_eq!(items[0].overdue_days, Some(19));
        assert_eq!(items[1].overdue_days, Some(5));
    }

    #[test]
    fn rules_cover_each_risk_item() {
        let items = rule_recommendations(&progress());
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| !i.actions.is_empty()));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let id = Uuid::new_v4();
        let content = format!(
            "```json\n{{\"summary\": \"Ưu tiên nhà thầu An Phát\", \"items\": \
             [{{\"contractorId\": \"{id}\", \"docTypeId\": \"{id}\", \
             \"actions\": [\"Họp\"]}}]}}\n```"
        );
        let advice = parse_advice(&content).unwrap();
        assert_eq!(advice.summary.as_deref(), Some("Ưu tiên nhà thầu An Phát"));
        assert_eq!(advice.items.len(), 1);
        assert!(parse_advice("không phải JSON").is_err());
    }

    #[tokio::test]
    async fn without_provider_rules_answer() {
        let state = lazy_state();
        let response = state.recommendation_service.resolve(&progress()).await;
        assert_eq!(response.source, RecommendationSource::Rules);
        assert!(response.summary.is_none());
        assert_eq!(response.items.len(), 3);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_rules() {
        let state = lazy_state();
        let service = RecommendationService::new(
            state.dashboard_service.clone(),
            Some(FixedProvider(Err(anyhow::anyhow!("timeout")))),
        );
        let response = service.resolve(&progress()).await;
        assert_eq!(response.source, RecommendationSource::Rules);
    }

    #[tokio::test]
    async fn provider_answer_is_filtered_to_asked_items() {
        let state = lazy_state();
        let progress = progress();
        let red = &progress[0].row;
        let advice = AiAdvice {
            summary: Some("Tập trung hồ sơ quá hạn".into()),
            items: vec![
                ItemRecommendation {
                    contractor_id: red.contractor_id,
                    doc_type_id: red.doc_type_id,
                    actions: vec!["Họp khẩn".into()],
                },
                ItemRecommendation {
                    contractor_id: Uuid::new_v4(),
                    doc_type_id: Uuid::new_v4(),
                    actions: vec!["Không liên quan".into()],
                },
            ],
        };
        let provider = Some(FixedProvider(Ok(advice)));
        let service = RecommendationService::new(state.dashboard_service.clone(), provider);

        let response = service.resolve(&progress).await;
        assert_eq!(response.source, RecommendationSource::Ai);
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].doc_type_id, red.doc_type_id);
    }
}
