//! API Router configuration

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health and status
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::daemon_status))
        // Engagements
        .route("/engagements", post(handlers::create_engagement))
        .route("/engagements/:id", get(handlers::get_engagement))
        .route("/engagements/:id/actions", get(handlers::engagement_actions))
        .route("/engagements/:id/actions", post(handlers::perform_engagement_action))
        .route(
            "/engagements/:id/requirements/:action",
            get(handlers::engagement_requirements),
        )
        .route("/engagements/:id/progress", get(handlers::engagement_progress))
        .route("/engagements/:id/trail", get(handlers::engagement_trail))
        .route("/engagements/:id/procedures", get(handlers::list_procedures))
        .route("/engagements/:id/procedures", post(handlers::create_procedure))
        // Procedures
        .route("/procedures/:id", get(handlers::get_procedure))
        .route("/procedures/:id/actions", get(handlers::procedure_actions))
        .route("/procedures/:id/actions", post(handlers::perform_procedure_action))
        .route(
            "/procedures/:id/requirements/:action",
            get(handlers::procedure_requirements),
        )
        .route("/procedures/:id/signoffs", post(handlers::record_signoff))
        .route("/procedures/:id/content", put(handlers::update_content))
        .route("/procedures/:id/progress", get(handlers::procedure_progress))
        .route("/procedures/:id/next-signoff", get(handlers::next_signoff))
        .route("/procedures/:id/trail", get(handlers::procedure_trail));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
