// src/services/dashboard_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProgressRepository, SubmissionRepository},
    models::{
        dashboard::{
            ComplianceMatrix, ContractorKpi, DashboardSummary, DocProgress, OverdueItem,
            ProcessingReport,
        },
        submission::TimelineEvent,
    },
    services::{
        aggregation,
        status::{derive_all, StatusPolicy},
        timeline,
    },
};

// Every view is computed from `v_doc_progress` at request time
#[derive(Clone)]
pub struct DashboardService {
    progress_repo: ProgressRepository,
    submission_repo: SubmissionRepository,
    policy: StatusPolicy,
}

impl DashboardService {
    pub fn new(
        progress_repo: ProgressRepository,
        submission_repo: SubmissionRepository,
        policy: StatusPolicy,
    ) -> Self {
        Self {
            progress_repo,
            submission_repo,
            policy,
        }
    }

    /// Derived rows; `scope` restricts to one contractor.
    pub async fn progress(
        &self,
        scope: Option<Uuid>,
        critical_only: bool,
    ) -> Result<Vec<DocProgress>, AppError> {
        let rows = self.progress_repo.list(scope, critical_only).await?;
        Ok(derive_all(rows, Utc::now(), &self.policy))
    }

    pub async fn summary(
        &self,
        scope: Option<Uuid>,
        critical_only: bool,
    ) -> Result<DashboardSummary, AppError> {
        let progress = self.progress(scope, critical_only).await?;
        Ok(aggregation::summary(&progress))
    }

    pub async fn contractor_kpis(
        &self,
        scope: Option<Uuid>,
        critical_only: bool,
    ) -> Result<Vec<ContractorKpi>, AppError> {
        let progress = self.progress(scope, critical_only).await?;
        Ok(aggregation::contractor_kpis(&progress))
    }

    pub async fn overdue(&self, scope: Option<Uuid>) -> Result<Vec<OverdueItem>, AppError> {
        let progress = self.progress(scope, true).await?;
        Ok(aggregation::overdue_critical(&progress))
    }

    pub async fn matrix(
        &self,
        scope: Option<Uuid>,
        critical_only: bool,
    ) -> Result<ComplianceMatrix, AppError> {
        let progress = self.progress(scope, critical_only).await?;
        Ok(aggregation::matrix(&progress))
    }

    pub async fn processing(&self, scope: Option<Uuid>) -> Result<ProcessingReport, AppError> {
        let rows = self.progress_repo.list(scope, false).await?;
        Ok(timeline::processing_report(&rows))
    }

    pub async fn timeline(
        &self,
        contractor_id: Uuid,
        doc_type_id: Uuid,
    ) -> Result<Vec<TimelineEvent>, AppError> {
        let submissions = self.submission_repo.list_for_pair(contractor_id, doc_type_id).await?;
        let events = self.submission_repo.events_for_pair(contractor_id, doc_type_id).await?;
        Ok(timeline::build_timeline(&submissions, &events))
    }
}
