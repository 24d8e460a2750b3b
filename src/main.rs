// src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::config::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let app_state = AppState::new(config).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("✅ Database migrations applied");

    if app_state.config.ai.api_key.is_none() {
        tracing::info!("AI_API_KEY not set; recommendations use the built-in rules");
    }

    let addr = app_state.config.bind_addr.clone();
    let app = routes::build_router(app_state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("🚀 Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
