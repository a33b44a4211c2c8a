use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/session/open", post(handlers::open_session))
        .route("/session/close", post(handlers::close_session))
        // Push-to-talk
        .route("/session/talk/start", post(handlers::start_talking))
        .route("/session/talk/stop", post(handlers::stop_talking))
        // Session queries
        .route("/session/status", get(handlers::get_status))
        .route("/session/messages", get(handlers::get_messages))
        .route("/session/scores", get(handlers::get_scores))
        .route("/session/report", get(handlers::get_report))
        .route("/session/review", get(handlers::get_review))
        // Request logging and browser access
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
