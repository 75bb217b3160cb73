//! HTTP facade.
//!
//! | Method | Path                      | Handler                     |
//! |--------|---------------------------|-----------------------------|
//! | GET    | `/`                       | landing page (askama)       |
//! | POST   | `/upload/`, `/upload`     | file → `DocumentRecord`     |
//! | POST   | `/chatbot/`, `/chatbot`   | `{text}` → `{response}`     |
//! | GET    | `/static/*`               | files from `static_dir`     |
//!
//! Client input errors become `400 {"detail": "..."}`. Every other failure
//! becomes an opaque `500 Internal Server Error`; the cause is only logged.

mod handlers;
mod routes;
mod state;
mod templates;

pub use routes::router;
pub use state::AppState;

use crate::config::ServiceConfig;
use crate::error::CertScanError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info, warn};

/// Bind to `config.bind_address()` and serve until the process is stopped.
pub async fn serve(config: &ServiceConfig, state: AppState) -> Result<(), CertScanError> {
    let addr = config.bind_address();
    let app = router(state, config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CertScanError::InvalidConfig(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| CertScanError::Internal(format!("Server error: {}", e)))
}

impl IntoResponse for CertScanError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            warn!("Rejected request: {}", self);
            let body = Json(serde_json::json!({ "detail": self.to_string() }));
            (StatusCode::BAD_REQUEST, body).into_response()
        } else {
            error!("Request failed: {}", self);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
