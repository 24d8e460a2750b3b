// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{CatalogRepository, ProfileRepository, ProgressRepository, SubmissionRepository},
    services::{
        admin_service::AdminService,
        auth::AuthService,
        dashboard_service::DashboardService,
        recommendation_service::{OpenAiProvider, RecommendationService},
        report_service::ReportService,
        status::{StatusPolicy, DEFAULT_AMBER_WINDOW_DAYS},
        submission_service::SubmissionService,
    },
};

/// AI provider settings; the provider is disabled without an API key.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub super_admin_email: Option<String>,
    pub run_token: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub ai: AiConfig,
    pub status_policy: StatusPolicy,
    pub cors_origins: Vec<String>,
    pub fonts_dir: String,
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(name: &str) -> anyhow::Result<String> {
    optional(name).with_context(|| format!("{name} must be set"))
}

/// Comma separated list, blanks dropped.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let amber_window_days = match optional("AMBER_WINDOW_DAYS") {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("AMBER_WINDOW_DAYS is not a number: {raw}"))?,
            None => DEFAULT_AMBER_WINDOW_DAYS,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            super_admin_email: optional("SUPER_ADMIN_EMAIL").map(|e| e.to_lowercase()),
            run_token: optional("RUN_TOKEN"),
            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),
            ai: AiConfig {
                api_key: optional("AI_API_KEY"),
                api_url: optional("AI_API_URL")
                    .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string()),
                model: optional("AI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
                timeout_secs: 20,
            },
            status_policy: StatusPolicy { amber_window_days },
            cors_origins: optional("CORS_ORIGINS").map(|raw| parse_list(&raw)).unwrap_or_default(),
            fonts_dir: optional("FONTS_DIR").unwrap_or_else(|| "./fonts".to_string()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: AppConfig,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub admin_service: AdminService,
    pub catalog_repo: CatalogRepository,
    pub submission_service: SubmissionService,
    pub dashboard_service: DashboardService,
    pub recommendation_service: RecommendationService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Failed to connect to the database")?;

        tracing::info!("✅ Database connection established");

        Self::from_pool(config, db_pool)
    }

    // Wires the dependency graph over an existing pool
    pub fn from_pool(config: AppConfig, db_pool: PgPool) -> anyhow::Result<Self> {
        let profile_repo = ProfileRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let submission_repo = SubmissionRepository::new(db_pool.clone());
        let progress_repo = ProgressRepository::new(db_pool.clone());

        let auth_service =
            AuthService::new(profile_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let admin_service = AdminService::new(
            profile_repo,
            db_pool.clone(),
            config.super_admin_email.clone(),
        );
        let submission_service = SubmissionService::new(submission_repo.clone(), db_pool.clone());
        let dashboard_service =
            DashboardService::new(progress_repo, submission_repo, config.status_policy);

        let provider = match &config.ai.api_key {
            Some(_) => Some(OpenAiProvider::new(&config.ai)?),
            None => None,
        };
        let recommendation_service =
            RecommendationService::new(dashboard_service.clone(), provider);
        let report_service = ReportService::new(
            dashboard_service.clone(),
            catalog_repo.clone(),
            config.fonts_dir.clone(),
        );

        Ok(Self {
            db_pool,
            config,
            i18n_store: I18nStore::new(),
            auth_service,
            admin_service,
            catalog_repo,
            submission_service,
            dashboard_service,
            recommendation_service,
            report_service,
        })
    }
}
