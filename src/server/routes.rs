use super::handlers;
use super::state::AppState;
use crate::config::ServiceConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Build the full router.
///
/// CORS mirrors the request origin and allows credentials, every method and
/// every header.
pub fn router(state: AppState, config: &ServiceConfig) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/upload/", post(handlers::upload))
        .route("/upload", post(handlers::upload))
        .route("/chatbot/", post(handlers::chatbot))
        .route("/chatbot", post(handlers::chatbot))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}
