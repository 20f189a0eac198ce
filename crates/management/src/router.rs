//! API router — mounts the full application surface under /api/v1.

use crate::auth;
use crate::handlers::{self, CoachState};
use crate::store::CoachStore;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router with all endpoints.
pub fn coach_router(store: Arc<CoachStore>, token_ttl_hours: i64) -> Router {
    let state = CoachState {
        store,
        token_ttl_hours,
    };

    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(handlers::handle_register))
        .route("/api/v1/auth/login", post(handlers::handle_login))
        .route("/api/v1/auth/me", get(handlers::current_user))
        // Branches
        .route("/api/v1/branches", get(handlers::list_branches).post(handlers::create_branch))
        // Leads
        .route("/api/v1/leads", get(handlers::list_leads).post(handlers::create_lead))
        .route("/api/v1/leads/{id}", get(handlers::get_lead).put(handlers::update_lead).delete(handlers::delete_lead))
        // Prompts
        .route("/api/v1/prompts", get(handlers::list_prompts).post(handlers::create_prompt))
        .route("/api/v1/prompts/{id}", get(handlers::get_prompt).put(handlers::update_prompt).delete(handlers::delete_prompt))
        // Calls
        .route("/api/v1/calls", get(handlers::list_calls).post(handlers::create_call))
        .route("/api/v1/calls/{id}", get(handlers::get_call))
        .route("/api/v1/calls/{id}/complete", post(handlers::complete_call))
        .route("/api/v1/calls/{id}/transcript", get(handlers::call_transcript))
        .route("/api/v1/calls/{id}/report", get(handlers::call_report))
        // Metrics
        .route("/api/v1/metrics/counts", get(handlers::metrics_counts))
        .route("/api/v1/metrics/funnel", get(handlers::metrics_funnel))
        .route("/api/v1/metrics/graphs", get(handlers::metrics_graphs))
        .route("/api/v1/metrics/trends/funnel", get(handlers::funnel_trends))
        .route("/api/v1/metrics/trends/call", get(handlers::call_trends))
        // Operational
        .route("/health", get(handlers::health_check))
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
