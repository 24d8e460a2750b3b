// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Catalog ---
        handlers::catalog::list_contractors,
        handlers::catalog::create_contractor,
        handlers::catalog::update_contractor,
        handlers::catalog::list_doc_types,
        handlers::catalog::create_doc_type,
        handlers::catalog::update_doc_type,
        handlers::catalog::list_requirements,
        handlers::catalog::upsert_requirement,
        handlers::catalog::delete_requirement,

        // --- Submissions ---
        handlers::submissions::list_submissions,
        handlers::submissions::create_submission,
        handlers::submissions::get_submission,
        handlers::submissions::submit_submission,
        handlers::submissions::approve_submission,
        handlers::submissions::reject_submission,
        handlers::submissions::bulk_review,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_progress,
        handlers::dashboard::get_contractor_kpis,
        handlers::dashboard::get_overdue,
        handlers::dashboard::get_matrix,
        handlers::dashboard::get_processing,
        handlers::dashboard::get_timeline,

        // --- Profiles ---
        handlers::profiles::list_profiles,
        handlers::profiles::update_profile,

        // --- Functions ---
        handlers::functions::activate_profile,
        handlers::functions::manage_invite,
        handlers::functions::manage_users,
        handlers::functions::ai_recommendations,
        handlers::functions::seed_first_admin,

        // --- Reports ---
        handlers::reports::contractor_report,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Profiles ---
            models::profile::UserRole,
            models::profile::ProfileStatus,
            models::profile::Profile,
            models::profile::UpdateProfilePayload,
            models::profile::InviteRequest,
            models::profile::InviteResponse,
            models::profile::ResetPasswordRequest,
            models::profile::ResetPasswordResponse,
            models::profile::DeleteUserRequest,
            models::profile::ActivateProfileRequest,

            // --- Catalog ---
            models::catalog::Contractor,
            models::catalog::ContractorPayload,
            models::catalog::DocType,
            models::catalog::DocTypePayload,
            models::catalog::ContractorRequirement,
            models::catalog::RequirementPayload,

            // --- Submissions ---
            models::submission::SubmissionStatus,
            models::submission::Submission,
            models::submission::CreateSubmissionPayload,
            models::submission::ReviewAction,
            models::submission::ReviewPayload,
            models::submission::BulkReviewPayload,
            models::submission::BulkReviewResult,
            models::submission::TimelineEvent,
            models::submission::TimelineEventKind,

            // --- Dashboard ---
            models::dashboard::StatusColor,
            models::dashboard::DocProgressRow,
            models::dashboard::DocProgress,
            models::dashboard::ColorCounts,
            models::dashboard::DashboardSummary,
            models::dashboard::ContractorKpi,
            models::dashboard::OverdueItem,
            models::dashboard::MatrixDocType,
            models::dashboard::MatrixCell,
            models::dashboard::MatrixRow,
            models::dashboard::ComplianceMatrix,
            models::dashboard::ProcessingStats,
            models::dashboard::ProcessingReport,

            // --- Recommendations ---
            models::recommendation::RecommendationRequest,
            models::recommendation::RiskItem,
            models::recommendation::ItemRecommendation,
            models::recommendation::RecommendationSource,
            models::recommendation::RecommendationResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Đăng nhập và đăng ký"),
        (name = "Users", description = "Hồ sơ người dùng hiện tại"),
        (name = "Catalog", description = "Nhà thầu, loại hồ sơ và yêu cầu"),
        (name = "Submissions", description = "Nộp và duyệt hồ sơ"),
        (name = "Dashboard", description = "Chỉ số tuân thủ HSE"),
        (name = "Profiles", description = "Quản lý tài khoản (quản trị)"),
        (name = "Functions", description = "Chức năng quản trị"),
        (name = "Reports", description = "Báo cáo PDF")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
