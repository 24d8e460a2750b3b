// src/db/submission_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::submission::{Submission, SubmissionEvent, SubmissionFilter, SubmissionStatus},
};

const SUBMISSION_COLUMNS: &str = "id, contractor_id, doc_type_id, status, cnt, note, review_note, \
     reviewed_by, created_at, submitted_at, approved_at, updated_at";

#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        contractor_id: Uuid,
        doc_type_id: Uuid,
        cnt: i32,
        note: Option<&str>,
        status: SubmissionStatus,
        created_at: DateTime<Utc>,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Result<Submission, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let submission = sqlx::query_as::<_, Submission>(&format!(
            r#"
            INSERT INTO submissions (
                contractor_id, doc_type_id, cnt, note, status,
                created_at, updated_at, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6, $7)
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(contractor_id)
        .bind(doc_type_id)
        .bind(cnt)
        .bind(note)
        .bind(status)
        .bind(created_at)
        .bind(submitted_at)
        .fetch_one(executor)
        .await?;
        Ok(submission)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Submission>, AppError> {
        let submission = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(submission)
    }

    /// Row-locks one submission until the transaction ends.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Submission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let submission = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(submission)
    }

    /// Row-locks the listed submissions that are still `submitted`.
    pub async fn lock_submitted<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
    ) -> Result<Vec<Submission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let submissions = sqlx::query_as::<_, Submission>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE id = ANY($1) AND status = 'submitted'
            ORDER BY id
            FOR UPDATE
            "#
        ))
        .bind(ids)
        .fetch_all(executor)
        .await?;
        Ok(submissions)
    }

    pub async fn list(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>, AppError> {
        let submissions = sqlx::query_as::<_, Submission>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE ($1::uuid IS NULL OR contractor_id = $1)
              AND ($2::uuid IS NULL OR doc_type_id = $2)
              AND ($3::submission_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT 1000
            "#
        ))
        .bind(filter.contractor_id)
        .bind(filter.doc_type_id)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }

    pub async fn list_for_pair(
        &self,
        contractor_id: Uuid,
        doc_type_id: Uuid,
    ) -> Result<Vec<Submission>, AppError> {
        let submissions = sqlx::query_as::<_, Submission>(&format!(
            r#"
            SELECT {SUBMISSION_COLUMNS}
            FROM submissions
            WHERE contractor_id = $1 AND doc_type_id = $2
            ORDER BY created_at
            "#
        ))
        .bind(contractor_id)
        .bind(doc_type_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }

    pub async fn events_for_pair(
        &self,
        contractor_id: Uuid,
        doc_type_id: Uuid,
    ) -> Result<Vec<SubmissionEvent>, AppError> {
        let events = sqlx::query_as::<_, SubmissionEvent>(
            r#"
            SELECT e.submission_id, e.kind, e.actor, e.note, e.occurred_at
            FROM submission_events e
            JOIN submissions s ON s.id = e.submission_id
            WHERE s.contractor_id = $1 AND s.doc_type_id = $2
            ORDER BY e.occurred_at, e.id
            "#,
        )
        .bind(contractor_id)
        .bind(doc_type_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    /// Writes the workflow columns of `next` if the row is still in `from`.
    /// `None` when it moved in between.
    pub async fn update_state<'e, E>(
        &self,
        executor: E,
        next: &Submission,
        from: SubmissionStatus,
    ) -> Result<Option<Submission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let submission = sqlx::query_as::<_, Submission>(&format!(
            r#"
            UPDATE submissions SET
                status = $3,
                review_note = $4,
                reviewed_by = $5,
                submitted_at = $6,
                approved_at = $7,
                updated_at = $8
            WHERE id = $1 AND status = $2
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(next.id)
        .bind(from)
        .bind(next.status)
        .bind(next.review_note.as_deref())
        .bind(next.reviewed_by)
        .bind(next.submitted_at)
        .bind(next.approved_at)
        .bind(next.updated_at)
        .fetch_optional(executor)
        .await?;
        Ok(submission)
    }

    pub async fn insert_event<'e, E>(
        &self,
        executor: E,
        event: &SubmissionEvent,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO submission_events (submission_id, kind, actor, note, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.submission_id)
        .bind(event.kind)
        .bind(event.actor)
        .bind(event.note.as_deref())
        .bind(event.occurred_at)
        .execute(executor)
        .await?;
        Ok(())
    }
}
