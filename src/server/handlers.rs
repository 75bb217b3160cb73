use super::state::AppState;
use super::templates::IndexTemplate;
use crate::error::CertScanError;
use crate::pipeline::input::DocumentKind;
use crate::record::{ChatPrompt, ChatReply, DocumentRecord};
use askama::Template;
use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    response::Html,
    Json,
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use tracing::info;

/// GET /
pub async fn index() -> Result<Html<String>, CertScanError> {
    let template = IndexTemplate {
        title: "Certificate Scanner",
        extensions: &DocumentKind::SUPPORTED_EXTENSIONS,
        version: env!("CARGO_PKG_VERSION"),
    };
    template
        .render()
        .map(Html)
        .map_err(|e| CertScanError::Internal(format!("Template error: {}", e)))
}

/// POST /upload/
///
/// Takes the part named `file`, or else the first part that carries a
/// filename, and streams it straight into the upload store.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DocumentRecord>, CertScanError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CertScanError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if !is_file {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        info!("Upload received: '{}'", file_name);

        let body = field.map_err(std::io::Error::other);
        let reader = StreamReader::new(body);
        tokio::pin!(reader);

        let record = state.processor.process(&file_name, &mut reader).await?;
        return Ok(Json(record));
    }
    Err(CertScanError::MissingUpload)
}

/// POST /chatbot/
pub async fn chatbot(
    State(state): State<AppState>,
    payload: Result<Json<ChatPrompt>, JsonRejection>,
) -> Result<Json<ChatReply>, CertScanError> {
    let Json(prompt) = payload.map_err(|e| CertScanError::InvalidRequest(e.body_text()))?;
    let response = state.chat.respond(&prompt.text).await?;
    Ok(Json(ChatReply { response }))
}
