// src/routes.rs

use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

// No configured origins means any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn build_router(app_state: AppState) -> Router {
    // Public
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/progress", get(handlers::dashboard::get_progress))
        .route("/contractors", get(handlers::dashboard::get_contractor_kpis))
        .route("/overdue", get(handlers::dashboard::get_overdue))
        .route("/matrix", get(handlers::dashboard::get_matrix))
        .route("/processing", get(handlers::dashboard::get_processing))
        .route("/timeline", get(handlers::dashboard::get_timeline));

    let function_routes = Router::new()
        .route("/activate-profile", post(handlers::functions::activate_profile))
        .route("/manage-invite", post(handlers::functions::manage_invite))
        .route("/manage-users", post(handlers::functions::manage_users))
        .route("/ai-recommendations", post(handlers::functions::ai_recommendations));

    // Everything below needs a bearer token
    let protected_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        // Catalog
        .route(
            "/contractors",
            get(handlers::catalog::list_contractors).post(handlers::catalog::create_contractor),
        )
        .route("/contractors/{id}", put(handlers::catalog::update_contractor))
        .route(
            "/doc-types",
            get(handlers::catalog::list_doc_types).post(handlers::catalog::create_doc_type),
        )
        .route("/doc-types/{id}", put(handlers::catalog::update_doc_type))
        .route(
            "/requirements",
            get(handlers::catalog::list_requirements).put(handlers::catalog::upsert_requirement),
        )
        .route(
            "/requirements/{contractor_id}/{doc_type_id}",
            delete(handlers::catalog::delete_requirement),
        )
        // Submissions
        .route(
            "/submissions",
            get(handlers::submissions::list_submissions)
                .post(handlers::submissions::create_submission),
        )
        .route("/submissions/bulk", post(handlers::submissions::bulk_review))
        .route("/submissions/{id}", get(handlers::submissions::get_submission))
        .route("/submissions/{id}/submit", post(handlers::submissions::submit_submission))
        .route("/submissions/{id}/approve", post(handlers::submissions::approve_submission))
        .route("/submissions/{id}/reject", post(handlers::submissions::reject_submission))
        // Admin
        .route("/profiles", get(handlers::profiles::list_profiles))
        .route("/profiles/{user_id}", patch(handlers::profiles::update_profile))
        .route("/reports/contractors/{id}", get(handlers::reports::contractor_report))
        .nest("/dashboard", dashboard_routes)
        .nest("/functions", function_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let cors = cors_layer(&app_state.config.cors_origins);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        // guarded by RUN_TOKEN instead of a user token
        .route("/api/functions/seed-first-admin", post(handlers::functions::seed_first_admin))
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::lazy_state;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let app = build_router(lazy_state());
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_router(lazy_state());
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let (status, body) = send(Request::get("/api/users/me").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let (status, _) = send(
            Request::get("/api/dashboard/summary")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn errors_follow_accept_language() {
        let (_, body) = send(
            Request::post("/api/functions/manage-users")
                .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .body(Body::from(r#"{"action":"delete_user"}"#))
                .unwrap(),
        )
        .await;
        let english = body["error"].as_str().unwrap_or_default().to_string();

        let (_, body) = send(
            Request::post("/api/functions/manage-users")
                .body(Body::from(r#"{"action":"delete_user"}"#))
                .unwrap(),
        )
        .await;
        let vietnamese = body["error"].as_str().unwrap_or_default().to_string();

        assert!(!english.is_empty());
        assert_ne!(english, vietnamese);
    }

    #[tokio::test]
    async fn seed_first_admin_checks_the_run_token() {
        let (status, _) = send(
            Request::post("/api/functions/seed-first-admin").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            Request::post("/api/functions/seed-first-admin")
                .header("x-run-token", "wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let request = Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/functions/manage-invite"].is_object());
    }
}
