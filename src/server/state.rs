use crate::chat::ChatService;
use crate::config::ServiceConfig;
use crate::error::CertScanError;
use crate::process::DocumentProcessor;
use std::sync::Arc;

/// Shared application state. Cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<DocumentProcessor>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(processor: DocumentProcessor, chat: ChatService) -> Self {
        Self {
            processor: Arc::new(processor),
            chat: Arc::new(chat),
        }
    }

    /// Build the production state from configuration. Loads the OCR models.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, CertScanError> {
        let processor = DocumentProcessor::from_config(config).await?;
        let chat = ChatService::from_settings(&config.llm)?;
        Ok(Self::new(processor, chat))
    }
}
