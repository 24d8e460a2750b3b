// src/services/submission_service.rs

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SubmissionRepository,
    models::{
        profile::Profile,
        submission::{
            BulkReviewResult, CreateSubmissionPayload, ReviewAction, Submission, SubmissionEvent,
            SubmissionEventKind, SubmissionFilter, SubmissionStatus,
        },
    },
};

/// Trimmed note, `None` when blank.
pub fn clean_note(note: Option<&str>) -> Option<&str> {
    note.map(str::trim).filter(|n| !n.is_empty())
}

/// Rejecting requires a reason; approving does not.
pub fn validate_review(action: ReviewAction, note: Option<&str>) -> Result<(), AppError> {
    if action == ReviewAction::Reject && clean_note(note).is_none() {
        return Err(AppError::NoteRequired);
    }
    Ok(())
}

/// The row after moving to `to`, and the event to record for the step.
///
/// `submitted_at` and `approved_at` keep their first value. The reviewer's
/// note goes to `review_note`; the contractor's `note` is never touched.
pub fn next_state(
    current: &Submission,
    to: SubmissionStatus,
    actor: Uuid,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(Submission, SubmissionEvent), AppError> {
    let from = current.status;
    let kind = match to.event_kind() {
        Some(kind) if from.can_transition_to(to) => kind,
        _ => return Err(AppError::InvalidStatusTransition { from, to }),
    };
    let note = clean_note(note).map(str::to_string);

    let mut next = current.clone();
    next.status = to;
    next.updated_at = now;

    match kind {
        SubmissionEventKind::Submitted => next.submitted_at = current.submitted_at.or(Some(now)),
        SubmissionEventKind::Approved => next.approved_at = current.approved_at.or(Some(now)),
        SubmissionEventKind::Revision => {}
    }

    let event_note = if kind == SubmissionEventKind::Submitted {
        None
    } else {
        next.reviewed_by = Some(actor);
        next.review_note = note.clone();
        note
    };

    let event = SubmissionEvent {
        submission_id: current.id,
        kind,
        actor: Some(actor),
        note: event_note,
        occurred_at: now,
    };
    Ok((next, event))
}

/// Keeps `requested` order, drops repeats.
fn dedup_ids(requested: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    requested.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[derive(Clone)]
pub struct SubmissionService {
    repo: SubmissionRepository,
    pool: PgPool,
}

impl SubmissionService {
    pub fn new(repo: SubmissionRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn create(
        &self,
        actor: &Profile,
        input: &CreateSubmissionPayload,
    ) -> Result<Submission, AppError> {
        if !actor.can_access_contractor(input.contractor_id) {
            return Err(AppError::Forbidden);
        }

        let now = Utc::now();
        let (status, submitted_at) = if input.submit {
            (SubmissionStatus::Submitted, Some(now))
        } else {
            (SubmissionStatus::Prepared, None)
        };

        let mut tx = self.pool.begin().await?;
        let submission = self
            .repo
            .create(
                &mut *tx,
                input.contractor_id,
                input.doc_type_id,
                input.cnt,
                clean_note(input.note.as_deref()),
                status,
                now,
                submitted_at,
            )
            .await?;

        if input.submit {
            let event = SubmissionEvent {
                submission_id: submission.id,
                kind: SubmissionEventKind::Submitted,
                actor: Some(actor.user_id),
                note: None,
                occurred_at: now,
            };
            self.repo.insert_event(&mut *tx, &event).await?;
        }
        tx.commit().await?;

        tracing::info!(
            submission_id = %submission.id,
            status = %submission.status,
            "Submission created"
        );
        Ok(submission)
    }

    pub async fn list(
        &self,
        actor: &Profile,
        mut filter: SubmissionFilter,
    ) -> Result<Vec<Submission>, AppError> {
        if let Some(scope) = actor.contractor_scope() {
            filter.contractor_id = Some(scope);
        }
        self.repo.list(&filter).await
    }

    pub async fn get(&self, actor: &Profile, id: Uuid) -> Result<Submission, AppError> {
        let submission = self.repo.find(id).await?.ok_or(AppError::NotFound("submission"))?;
        if !actor.can_access_contractor(submission.contractor_id) {
            // do not reveal other contractors' rows
            return Err(AppError::NotFound("submission"));
        }
        Ok(submission)
    }

    /// prepared | revision -> submitted, by the owning contractor or an admin.
    pub async fn submit(&self, actor: &Profile, id: Uuid) -> Result<Submission, AppError> {
        // scope check first so other contractors' rows stay invisible
        self.get(actor, id).await?;

        let mut tx = self.pool.begin().await?;
        let current = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("submission"))?;
        let updated = self
            .advance(&mut tx, &current, SubmissionStatus::Submitted, actor.user_id, None)
            .await?;
        tx.commit().await?;

        tracing::info!(submission_id = %id, "Submission submitted");
        Ok(updated)
    }

    /// Admin review of one submitted row.
    pub async fn review(
        &self,
        reviewer: &Profile,
        id: Uuid,
        action: ReviewAction,
        note: Option<&str>,
    ) -> Result<Submission, AppError> {
        validate_review(action, note)?;

        let mut tx = self.pool.begin().await?;
        let current = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("submission"))?;
        let updated = self
            .advance(&mut tx, &current, action.target_status(), reviewer.user_id, note)
            .await?;
        tx.commit().await?;

        tracing::info!(
            submission_id = %id,
            reviewer = %reviewer.user_id,
            action = ?action,
            "Submission reviewed"
        );
        Ok(updated)
    }

    /// Reviews many rows in one transaction; rows not in `submitted` are skipped.
    pub async fn bulk_review(
        &self,
        reviewer: &Profile,
        ids: &[Uuid],
        action: ReviewAction,
        note: Option<&str>,
    ) -> Result<BulkReviewResult, AppError> {
        validate_review(action, note)?;

        let ids = dedup_ids(ids);

        let mut tx = self.pool.begin().await?;
        let pending = self.repo.lock_submitted(&mut *tx, &ids).await?;
        let mut updated = Vec::with_capacity(pending.len());
        for current in &pending {
            self.advance(&mut tx, current, action.target_status(), reviewer.user_id, note)
                .await?;
            updated.push(current.id);
        }
        tx.commit().await?;

        let skipped: Vec<Uuid> = ids.iter().copied().filter(|id| !updated.contains(id)).collect();

        tracing::info!(
            reviewer = %reviewer.user_id,
            action = ?action,
            updated = updated.len(),
            skipped = skipped.len(),
            "Bulk review applied"
        );

        Ok(BulkReviewResult {
            action,
            updated,
            skipped,
        })
    }

    // Writes the next state and its event on the caller's transaction.
    async fn advance(
        &self,
        conn: &mut PgConnection,
        current: &Submission,
        to: SubmissionStatus,
        actor: Uuid,
        note: Option<&str>,
    ) -> Result<Submission, AppError> {
        let (next, event) = next_state(current, to, actor, note, Utc::now())?;
        let updated = self
            .repo
            .update_state(&mut *conn, &next, current.status)
            .await?
            .ok_or(AppError::InvalidStatusTransition {
                from: current.status,
                to,
            })?;
        self.repo.insert_event(&mut *conn, &event).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::tests::lazy_state,
        models::profile::{ProfileStatus, UserRole},
        services::{status::tests::at, timeline::processing_days},
    };

    fn admin() -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            role: UserRole::Admin,
            contractor_id: None,
            status: ProfileStatus::Active,
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn prepared(note: Option<&str>) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            contractor_id: Uuid::new_v4(),
            doc_type_id: Uuid::new_v4(),
            status: SubmissionStatus::Prepared,
            cnt: 1,
            note: note.map(str::to_string),
            review_note: None,
            reviewed_by: None,
            created_at: at(2023, 12, 30),
            submitted_at: None,
            approved_at: None,
            updated_at: at(2023, 12, 30),
        }
    }

    #[test]
    fn resubmission_keeps_first_submission_time() {
        let (contractor, reviewer) = (Uuid::new_v4(), Uuid::new_v4());
        let row = prepared(None);

        let (row, submitted) =
            next_state(&row, SubmissionStatus::Submitted, contractor, None, at(2024, 1, 1))
                .unwrap();
        let (row, revision) = next_state(
            &row,
            SubmissionStatus::Revision,
            reviewer,
            Some("Thiếu trang 2"),
            at(2024, 1, 5),
        )
        .unwrap();
        let (row, resubmitted) =
            next_state(&row, SubmissionStatus::Submitted, contractor, None, at(2024, 1, 20))
                .unwrap();
        let (row, approved) =
            next_state(&row, SubmissionStatus::Approved, reviewer, None, at(2024, 1, 21)).unwrap();

        assert_eq!(row.status, SubmissionStatus::Approved);
        assert_eq!(row.submitted_at, Some(at(2024, 1, 1)));
        assert_eq!(row.approved_at, Some(at(2024, 1, 21)));
        assert_eq!(processing_days(row.submitted_at, row.approved_at), Some(20.0));

        let kinds: Vec<_> = [&submitted, &revision, &resubmitted, &approved]
            .iter()
            .map(|e| (e.kind, e.occurred_at))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (SubmissionEventKind::Submitted, at(2024, 1, 1)),
                (SubmissionEventKind::Revision, at(2024, 1, 5)),
                (SubmissionEventKind::Submitted, at(2024, 1, 20)),
                (SubmissionEventKind::Approved, at(2024, 1, 21)),
            ]
        );
        assert_eq!(revision.note.as_deref(), Some("Thiếu trang 2"));
        assert_eq!(revision.actor, Some(reviewer));
    }

    #[test]
    fn review_note_does_not_replace_contractor_note() {
        let reviewer = Uuid::new_v4();
        let mut row = prepared(Some("Bản gốc có dấu"));
        row.status = SubmissionStatus::Submitted;
        row.submitted_at = Some(at(2024, 1, 1));

        let (rejected, _) = next_state(
            &row,
            SubmissionStatus::Revision,
            reviewer,
            Some("  Ảnh bị mờ "),
            at(2024, 1, 2),
        )
        .unwrap();
        assert_eq!(rejected.note.as_deref(), Some("Bản gốc có dấu"));
        assert_eq!(rejected.review_note.as_deref(), Some("Ảnh bị mờ"));
        assert_eq!(rejected.reviewed_by, Some(reviewer));

        let (resubmitted, event) =
            next_state(&rejected, SubmissionStatus::Submitted, Uuid::new_v4(), None, at(2024, 1, 3))
                .unwrap();
        assert_eq!(resubmitted.note.as_deref(), Some("Bản gốc có dấu"));
        assert_eq!(resubmitted.review_note.as_deref(), Some("Ảnh bị mờ"));
        assert_eq!(event.note, None);
    }

    #[test]
    fn illegal_steps_are_refused() {
        let row = prepared(None);
        let anyone = Uuid::new_v4();
        let err = next_state(&row, SubmissionStatus::Approved, anyone, None, at(2024, 1, 1));
        assert!(matches!(
            err,
            Err(AppError::InvalidStatusTransition {
                from: SubmissionStatus::Prepared,
                to: SubmissionStatus::Approved
            })
        ));

        let err = next_state(&row, SubmissionStatus::Prepared, anyone, None, at(2024, 1, 1));
        assert!(matches!(err, Err(AppError::InvalidStatusTransition { .. })));
    }

    #[tokio::test]
    async fn bulk_reject_without_note_fails_before_querying() {
        let state = lazy_state();
        let result = state
            .submission_service
            .bulk_review(&admin(), &[Uuid::new_v4()], ReviewAction::Reject, None)
            .await;
        assert!(matches!(result, Err(AppError::NoteRequired)));

        let result = state
            .submission_service
            .bulk_review(&admin(), &[Uuid::new_v4()], ReviewAction::Reject, Some("  "))
            .await;
        assert!(matches!(result, Err(AppError::NoteRequired)));
    }

    #[test]
    fn reject_requires_a_note() {
        assert!(matches!(validate_review(ReviewAction::Reject, None), Err(AppError::NoteRequired)));
        assert!(matches!(
            validate_review(ReviewAction::Reject, Some("   ")),
            Err(AppError::NoteRequired)
        ));
        assert!(validate_review(ReviewAction::Reject, Some("Thiếu chữ ký")).is_ok());
    }

    #[test]
    fn approve_note_is_optional() {
        assert!(validate_review(ReviewAction::Approve, None).is_ok());
        assert!(validate_review(ReviewAction::Approve, Some("")).is_ok());
        assert!(validate_review(ReviewAction::Approve, Some("OK")).is_ok());
    }

    #[test]
    fn notes_are_trimmed() {
        assert_eq!(clean_note(Some("  thiếu trang 2 ")), Some("thiếu trang 2"));
        assert_eq!(clean_note(Some("\n")), None);
        assert_eq!(clean_note(None), None);
    }

    #[test]
    fn duplicate_ids_collapse() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(dedup_ids(&[a, b, a, b, a]), vec![a, b]);
    }
}
