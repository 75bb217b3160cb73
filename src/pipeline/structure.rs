//! Structured extraction: OCR text → [`DocumentRecord`].

use crate::error::CertScanError;
use crate::pipeline::llm::{ChatBackend, ChatRequest, OutputSchema};
use crate::prompts::{extraction_user_message, EXTRACTION_SYSTEM_PROMPT};
use crate::record::{CandidateFields, DocumentRecord};
use std::sync::Arc;
use tracing::{debug, info};

/// Asks the hosted model to fill [`CandidateFields`] from raw text.
///
/// The whole record is produced by one call. A reply that does not
/// deserialise into every field fails the request.
pub struct StructuredExtractor {
    backend: Arc<dyn ChatBackend>,
    schema: OutputSchema,
    temperature: f32,
    max_tokens: usize,
}

impl StructuredExtractor {
    pub fn new(backend: Arc<dyn ChatBackend>, temperature: f32, max_tokens: usize) -> Self {
        Self {
            backend,
            schema: OutputSchema::for_type::<CandidateFields>(
                CandidateFields::SCHEMA_NAME,
                "Record the candidate details found in the document text.",
            ),
            temperature,
            max_tokens,
        }
    }

    pub fn schema(&self) -> &OutputSchema {
        &self.schema
    }

    pub async fn extract_fields(
        &self,
        file_name: &str,
        text: &str,
    ) -> Result<DocumentRecord, CertScanError> {
        let request = ChatRequest {
            system: EXTRACTION_SYSTEM_PROMPT.to_string(),
            user: extraction_user_message(text),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!(
            "Structured extraction for '{}' via {} ({} chars)",
            file_name,
            self.backend.name(),
            text.len()
        );

        let value = self
            .backend
            .complete_structured(&request, &self.schema)
            .await?;
        let fields: CandidateFields =
            serde_json::from_value(value).map_err(|e| CertScanError::SchemaViolation {
                schema: self.schema.name.clone(),
                detail: e.to_string(),
            })?;

        info!("Extracted fields for '{}'", file_name);
        Ok(DocumentRecord::from_fields(file_name, text, fields))
    }
}
