// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{
        Contractor, ContractorPayload, ContractorRequirement, DocType, DocTypePayload,
        RequirementPayload,
    },
};

// Admin-managed reference data: contractors, doc types, requirements
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CONTRACTORS
    // =========================================================================

    pub async fn list_contractors(&self, only: Option<Uuid>) -> Result<Vec<Contractor>, AppError> {
        let contractors = sqlx::query_as::<_, Contractor>(
            r#"
            SELECT id, name, created_at
            FROM contractors
            WHERE ($1::uuid IS NULL OR id = $1)
            ORDER BY name
            "#,
        )
        .bind(only)
        .fetch_all(&self.pool)
        .await?;
        Ok(contractors)
    }

    pub async fn find_contractor(&self, id: Uuid) -> Result<Option<Contractor>, AppError> {
        let contractor = sqlx::query_as::<_, Contractor>(
            "SELECT id, name, created_at FROM contractors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contractor)
    }

    pub async fn create_contractor(
        &self,
        input: &ContractorPayload,
    ) -> Result<Contractor, AppError> {
        let contractor = sqlx::query_as::<_, Contractor>(
            "INSERT INTO contractors (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(input.name.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(contractor)
    }

    pub async fn update_contractor(
        &self,
        id: Uuid,
        input: &ContractorPayload,
    ) -> Result<Contractor, AppError> {
        sqlx::query_as::<_, Contractor>(
            "UPDATE contractors SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .bind(input.name.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("contractor"))
    }

    // =========================================================================
    //  DOC TYPES
    // =========================================================================

    pub async fn list_doc_types(&self) -> Result<Vec<DocType>, AppError> {
        let doc_types = sqlx::query_as::<_, DocType>(
            r#"
            SELECT id, code, name, category, is_critical, weight, created_at
            FROM doc_types
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(doc_types)
    }

    pub async fn create_doc_type(&self, input: &DocTypePayload) -> Result<DocType, AppError> {
        let doc_type = sqlx::query_as::<_, DocType>(
            r#"
            INSERT INTO doc_types (code, name, category, is_critical, weight)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, code, name, category, is_critical, weight, created_at
            "#,
        )
        .bind(input.code.trim())
        .bind(input.name.trim())
        .bind(input.category.as_deref())
        .bind(input.is_critical)
        .bind(input.weight.unwrap_or(Decimal::ONE))
        .fetch_one(&self.pool)
        .await?;
        Ok(doc_type)
    }

    pub async fn update_doc_type(
        &self,
        id: Uuid,
        input: &DocTypePayload,
    ) -> Result<DocType, AppError> {
        sqlx::query_as::<_, DocType>(
            r#"
            UPDATE doc_types SET
                code = $2,
                name = $3,
                category = $4,
                is_critical = $5,
                weight = COALESCE($6, weight)
            WHERE id = $1
            RETURNING id, code, name, category, is_critical, weight, created_at
            "#,
        )
        .bind(id)
        .bind(input.code.trim())
        .bind(input.name.trim())
        .bind(input.category.as_deref())
        .bind(input.is_critical)
        .bind(input.weight)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("doc_type"))
    }

    // =========================================================================
    //  REQUIREMENTS
    // =========================================================================

    pub async fn list_requirements(
        &self,
        contractor_id: Option<Uuid>,
    ) -> Result<Vec<ContractorRequirement>, AppError> {
        let requirements = sqlx::query_as::<_, ContractorRequirement>(
            r#"
            SELECT contractor_id, doc_type_id, required_count, planned_due_date, updated_at
            FROM contractor_requirements
            WHERE ($1::uuid IS NULL OR contractor_id = $1)
            ORDER BY contractor_id, doc_type_id
            "#,
        )
        .bind(contractor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requirements)
    }

    // UPSERT on (contractor_id, doc_type_id)
    pub async fn upsert_requirement(
        &self,
        input: &RequirementPayload,
    ) -> Result<ContractorRequirement, AppError> {
        let requirement = sqlx::query_as::<_, ContractorRequirement>(
            r#"
            INSERT INTO contractor_requirements
                (contractor_id, doc_type_id, required_count, planned_due_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (contractor_id, doc_type_id)
            DO UPDATE SET
                required_count = EXCLUDED.required_count,
                planned_due_date = EXCLUDED.planned_due_date,
                updated_at = NOW()
            RETURNING contractor_id, doc_type_id, required_count, planned_due_date, updated_at
            "#,
        )
        .bind(input.contractor_id)
        .bind(input.doc_type_id)
        .bind(input.required_count)
        .bind(input.planned_due_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(requirement)
    }

    pub async fn delete_requirement(
        &self,
        contractor_id: Uuid,
        doc_type_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM contractor_requirements WHERE contractor_id = $1 AND doc_type_id = $2",
        )
        .bind(contractor_id)
        .bind(doc_type_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("requirement"));
        }
        Ok(())
    }
}
