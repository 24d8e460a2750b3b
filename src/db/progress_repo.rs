// src/db/progress_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::dashboard::DocProgressRow};

// Read-only access to `v_doc_progress`
#[derive(Clone)]
pub struct ProgressRepository {
    pool: PgPool,
}

impl ProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        contractor_id: Option<Uuid>,
        critical_only: bool,
    ) -> Result<Vec<DocProgressRow>, AppError> {
        let rows = sqlx::query_as::<_, DocProgressRow>(
            r#"
            SELECT
                contractor_id, contractor_name,
                doc_type_id, doc_code, doc_name, category, is_critical, weight,
                required_count, approved_count, submitted_count,
                first_submitted_at, first_approved_at, planned_due_date
            FROM v_doc_progress
            WHERE ($1::uuid IS NULL OR contractor_id = $1)
              AND (NOT $2 OR is_critical)
            ORDER BY contractor_name, doc_code
            "#,
        )
        .bind(contractor_id)
        .bind(critical_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
