//! API routes.

use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::auth::access_gate;
use crate::handlers::accounts::{
    admin_overview, dashboard, get_profile, list_accounts, update_profile,
};
use crate::handlers::applications::{
    list_job_applications, list_my_applications, update_application_status,
};
use crate::handlers::auth_entry::{login, logout, signup};
use crate::handlers::jobs::{
    apply_to_job, create_job, delete_job, get_job, list_jobs, update_job,
};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Public browsing routes (no session required)
    let public_routes = Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/:job_id", get(get_job));

    // Credential endpoints
    let auth_routes = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout));

    // Candidate routes
    let candidate_routes = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/profile", get(get_profile))
        .route("/profile", patch(update_profile))
        .route("/applications", get(list_my_applications))
        .route("/jobs/:job_id/apply", post(apply_to_job));

    // Admin routes
    let admin_routes = Router::new()
        .route("/admin", get(admin_overview))
        .route("/admin/jobs", post(create_job))
        .route("/admin/jobs/:job_id", patch(update_job))
        .route("/admin/jobs/:job_id", delete(delete_job))
        .route("/admin/jobs/:job_id/applications", get(list_job_applications))
        .route("/admin/applications/:application_id/status", patch(update_application_status))
        .route("/admin/accounts", get(list_accounts));

    // Create rate limiter for application routes
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    // More restrictive rate limiter for credential endpoints (5 req/sec)
    // to slow down password guessing
    let auth_rate_limiter = std::sync::Arc::new(RateLimiterCache::new(5));

    let auth_routes = auth_routes.layer(middleware::from_fn_with_state(
        auth_rate_limiter,
        rate_limit_middleware,
    ));

    let app_routes = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(candidate_routes)
        .merge(admin_routes)
        // Access gate runs before the rate limiter so redirects are
        // decided on the original request path
        .layer(middleware::from_fn_with_state(
            rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), access_gate));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(app_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
