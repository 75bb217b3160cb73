//! Stateless chat passthrough.

use crate::config::LlmSettings;
use crate::error::CertScanError;
use crate::pipeline::llm::{build_backend, ChatBackend, ChatRequest};
use crate::prompts::CHAT_SYSTEM_PROMPT;
use std::sync::Arc;
use tracing::debug;

/// Forwards one user message to the chat model. No history is kept.
pub struct ChatService {
    backend: Arc<dyn ChatBackend>,
    temperature: f32,
    max_tokens: usize,
}

impl ChatService {
    pub fn new(backend: Arc<dyn ChatBackend>, temperature: f32, max_tokens: usize) -> Self {
        Self {
            backend,
            temperature,
            max_tokens,
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self, CertScanError> {
        let backend = build_backend(settings, &settings.chat_model)?;
        Ok(Self::new(
            backend,
            settings.chat_temperature,
            settings.max_tokens,
        ))
    }

    /// Reply to `text`. Only an empty string is rejected; whitespace is sent as-is.
    pub async fn respond(&self, text: &str) -> Result<String, CertScanError> {
        if text.is_empty() {
            return Err(CertScanError::EmptyChatText);
        }
        let request = ChatRequest {
            system: CHAT_SYSTEM_PROMPT.to_string(),
            user: text.to_string(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let reply = self.backend.complete(&request).await?;
        debug!("{} replied with {} chars", self.backend.name(), reply.len());
        Ok(reply)
    }
}
