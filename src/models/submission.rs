// src/models/submission.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Maps the Postgres enum `submission_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "submission_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Prepared,
    Submitted,
    Approved,
    Revision,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Prepared => "prepared",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Revision => "revision",
        }
    }

    /// Event recorded when a row enters this status.
    pub fn event_kind(&self) -> Option<SubmissionEventKind> {
        match self {
            SubmissionStatus::Prepared => None,
            SubmissionStatus::Submitted => Some(SubmissionEventKind::Submitted),
            SubmissionStatus::Approved => Some(SubmissionEventKind::Approved),
            SubmissionStatus::Revision => Some(SubmissionEventKind::Revision),
        }
    }

    /// Review workflow: prepared/revision -> submitted -> approved | revision.
    pub fn can_transition_to(&self, next: SubmissionStatus) -> bool {
        matches!(
            (self, next),
            (SubmissionStatus::Prepared, SubmissionStatus::Submitted)
                | (SubmissionStatus::Revision, SubmissionStatus::Submitted)
                | (SubmissionStatus::Submitted, SubmissionStatus::Approved)
                | (SubmissionStatus::Submitted, SubmissionStatus::Revision)
        )
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub contractor_id: Uuid,
    pub doc_type_id: Uuid,
    pub status: SubmissionStatus,
    #[schema(example = 2)]
    pub cnt: i32,
    /// The contractor's note.
    pub note: Option<String>,
    /// Reason given by the last reviewer.
    pub review_note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// First submission; resubmissions are kept in `submission_events`.
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// Maps the Postgres enum `submission_event_kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "submission_event_kind", rename_all = "lowercase")]
pub enum SubmissionEventKind {
    Submitted,
    Approved,
    Revision,
}

/// One workflow step of a submission, as stored in `submission_events`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SubmissionEvent {
    pub submission_id: Uuid,
    pub kind: SubmissionEventKind,
    pub actor: Option<Uuid>,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionPayload {
    pub contractor_id: Uuid,
    pub doc_type_id: Uuid,

    #[validate(range(min = 1, message = "Số lượng phải lớn hơn 0."))]
    #[serde(default = "default_cnt")]
    #[schema(example = 1)]
    pub cnt: i32,

    #[validate(length(max = 2000, message = "Ghi chú quá dài."))]
    pub note: Option<String>,

    /// Submit right away instead of keeping the batch as `prepared`.
    #[serde(default)]
    pub submit: bool,
}

fn default_cnt() -> i32 {
    1
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SubmissionFilter {
    pub contractor_id: Option<Uuid>,
    pub doc_type_id: Option<Uuid>,
    pub status: Option<SubmissionStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn target_status(&self) -> SubmissionStatus {
        match self {
            ReviewAction::Approve => SubmissionStatus::Approved,
            ReviewAction::Reject => SubmissionStatus::Revision,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    #[validate(length(max = 2000, message = "Ghi chú quá dài."))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkReviewPayload {
    #[validate(length(min = 1, max = 500, message = "Chọn từ 1 đến 500 hồ sơ."))]
    pub ids: Vec<Uuid>,

    pub action: ReviewAction,

    #[validate(length(max = 2000, message = "Ghi chú quá dài."))]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkReviewResult {
    pub action: ReviewAction,
    pub updated: Vec<Uuid>,
    /// Ids that were not in `submitted` state, or do not exist.
    pub skipped: Vec<Uuid>,
}

/// A point on the submission timeline of one (contractor, doc type) pair.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub submission_id: Uuid,
    pub kind: TimelineEventKind,
    pub at: DateTime<Utc>,
    pub cnt: i32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimelineEventKind {
    Created,
    Submitted,
    Approved,
    Revision,
}

impl From<SubmissionEventKind> for TimelineEventKind {
    fn from(kind: SubmissionEventKind) -> Self {
        match kind {
            SubmissionEventKind::Submitted => TimelineEventKind::Submitted,
            SubmissionEventKind::Approved => TimelineEventKind::Approved,
            SubmissionEventKind::Revision => TimelineEventKind::Revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_workflow_transitions() {
        use SubmissionStatus::*;

        assert!(Prepared.can_transition_to(Submitted));
        assert!(Revision.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(Revision));

        assert!(!Prepared.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Revision));
        assert!(!Approved.can_transition_to(Submitted));
        assert!(!Revision.can_transition_to(Approved));
    }

    #[test]
    fn create_payload_defaults() {
        let payload: CreateSubmissionPayload = serde_json::from_value(serde_json::json!({
            "contractorId": Uuid::nil(),
            "docTypeId": Uuid::nil(),
        }))
        .unwrap();

        assert_eq!(payload.cnt, 1);
        assert!(!payload.submit);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn bulk_payload_rejects_empty_selection() {
        let payload = BulkReviewPayload {
            ids: vec![],
            action: ReviewAction::Approve,
            note: None,
        };
        assert!(payload.validate().is_err());
    }
}
