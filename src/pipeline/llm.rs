//! Hosted LLM access.
//!
//! [`ChatBackend`] is the seam between the pipeline and the model provider.
//! [`ProviderBackend`] implements it over any `edgequake_llm` provider.
//! Groq is reached through edgequake-llm's OpenAI-compatible provider.
//!
//! Structured output is always server-side: the request carries one tool
//! whose parameters are the target JSON Schema, and `tool_choice` forces the
//! model to call it. Nothing is repaired locally. A reply without that tool
//! call is a [`CertScanError::SchemaViolation`].
//!
//! Neither path retries. A failed call is a failed request.

use crate::config::LlmSettings;
use crate::error::CertScanError;
use async_trait::async_trait;
use edgequake_llm::{
    ChatMessage, CompletionOptions, ConfigProviderType, LLMProvider, OpenAICompatibleProvider,
    ProviderConfig, ProviderFactory, ToolChoice, ToolDefinition,
};
use schemars::JsonSchema;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A two-message prompt: fixed system preamble plus one human turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl ChatRequest {
    fn messages(&self) -> [ChatMessage; 2] {
        [ChatMessage::system(&self.system), ChatMessage::user(&self.user)]
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

/// Target shape for structured output.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema of the object the model must return.
    pub schema: Value,
}

impl OutputSchema {
    /// Derive the schema from a `JsonSchema` type.
    pub fn for_type<T: JsonSchema>(name: &str, description: &str) -> Self {
        let mut schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null);
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
        }
        Self {
            name: name.to_string(),
            description: description.to_string(),
            schema,
        }
    }

    /// The single tool the model is forced to call.
    fn tool(&self) -> ToolDefinition {
        let mut tool = ToolDefinition::function(&self.name, &self.description, self.schema.clone());
        // Plain OpenAI function shape; no `strict` flag.
        tool.function.strict = None;
        tool
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Provider/model label for logs.
    fn name(&self) -> String;

    /// Free-text completion; returns the reply content verbatim.
    async fn complete(&self, request: &ChatRequest) -> Result<String, CertScanError>;

    /// Completion coerced to `schema`; returns the tool arguments as JSON.
    async fn complete_structured(
        &self,
        request: &ChatRequest,
        schema: &OutputSchema,
    ) -> Result<Value, CertScanError>;
}

/// Build the backend for `model` according to `settings.provider`.
///
/// A Groq backend without an API key still builds; every call on it fails
/// with [`CertScanError::ProviderNotConfigured`].
pub fn build_backend(
    settings: &LlmSettings,
    model: &str,
) -> Result<Arc<dyn ChatBackend>, CertScanError> {
    let label = format!("{}/{}", settings.provider.to_lowercase(), model);

    if settings.provider.eq_ignore_ascii_case("groq") {
        let api_key = settings.api_key.as_deref().filter(|k| !k.is_empty());
        return match api_key {
            Some(key) => {
                let provider = groq_provider(&settings.base_url, model, key)?;
                Ok(Arc::new(ProviderBackend::new(Arc::new(provider), label)))
            }
            None => Ok(Arc::new(Unconfigured {
                provider: "groq".into(),
                hint: "GROQ_API_KEY not set. Get an API key from https://console.groq.com/".into(),
            })),
        };
    }

    let provider = ProviderFactory::create_llm_provider(&settings.provider, model).map_err(|e| {
        CertScanError::ProviderNotConfigured {
            provider: settings.provider.clone(),
            hint: format!("{e}"),
        }
    })?;
    Ok(Arc::new(ProviderBackend::new(provider, label)))
}

/// OpenAI-compatible provider pointed at Groq (or any `base_url`).
///
/// The key travels as a configured `Authorization` header so that several
/// backends with different keys can coexist in one process.
pub fn groq_provider(
    base_url: &str,
    model: &str,
    api_key: &str,
) -> Result<OpenAICompatibleProvider, CertScanError> {
    let mut headers = HashMap::new();
    headers.insert("Authorization".to_string(), format!("Bearer {api_key}"));

    let config = ProviderConfig {
        name: "groq".into(),
        display_name: "Groq".into(),
        provider_type: ConfigProviderType::OpenAICompatible,
        base_url: Some(base_url.trim_end_matches('/').to_string()),
        default_llm_model: Some(model.to_string()),
        headers,
        ..Default::default()
    };
    OpenAICompatibleProvider::from_config(config).map_err(|e| {
        CertScanError::ProviderNotConfigured {
            provider: "groq".into(),
            hint: format!("{e}"),
        }
    })
}

// ── edgequake-llm adapter ────────────────────────────────────────────────────

/// Adapter over any `edgequake_llm` provider (Groq, OpenAI, Anthropic, Gemini, Ollama, …).
pub struct ProviderBackend {
    provider: Arc<dyn LLMProvider>,
    label: String,
}

impl ProviderBackend {
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>) -> Self {
        Self {
            provider,
            label: label.into(),
        }
    }
}

fn api_error(e: edgequake_llm::LlmError) -> CertScanError {
    CertScanError::LlmApiError {
        message: e.to_string(),
    }
}

#[async_trait]
impl ChatBackend for ProviderBackend {
    fn name(&self) -> String {
        self.label.clone()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, CertScanError> {
        let start = Instant::now();
        let response = self
            .provider
            .chat(&request.messages(), Some(&request.options()))
            .await
            .map_err(api_error)?;
        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            self.label,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.is_empty() {
            return Err(CertScanError::LlmApiError {
                message: format!("{} returned an empty reply", self.label),
            });
        }
        Ok(response.content)
    }

    async fn complete_structured(
        &self,
        request: &ChatRequest,
        schema: &OutputSchema,
    ) -> Result<Value, CertScanError> {
        let start = Instant::now();
        let response = self
            .provider
            .chat_with_tools(
                &request.messages(),
                &[schema.tool()],
                Some(ToolChoice::function(&schema.name)),
                Some(&request.options()),
            )
            .await
            .map_err(api_error)?;
        debug!(
            "{}: structured {} in {:?}",
            self.label,
            schema.name,
            start.elapsed()
        );

        let call = response
            .tool_calls
            .iter()
            .find(|c| c.name() == schema.name)
            .ok_or_else(|| CertScanError::SchemaViolation {
                schema: schema.name.clone(),
                detail: "model did not call the extraction tool".into(),
            })?;
        call.parse_arguments::<Value>()
            .map_err(|e| CertScanError::SchemaViolation {
                schema: schema.name.clone(),
                detail: e.to_string(),
            })
    }
}

/// Stand-in for a provider whose credentials are missing.
struct Unconfigured {
    provider: String,
    hint: String,
}

impl Unconfigured {
    fn error(&self) -> CertScanError {
        CertScanError::ProviderNotConfigured {
            provider: self.provider.clone(),
            hint: self.hint.clone(),
        }
    }
}

#[async_trait]
impl ChatBackend for Unconfigured {
    fn name(&self) -> String {
        format!("{} (unconfigured)", self.provider)
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<String, CertScanError> {
        Err(self.error())
    }

    async fn complete_structured(
        &self,
        _request: &ChatRequest,
        _schema: &OutputSchema,
    ) -> Result<Value, CertScanError> {
        Err(self.error())
    }
}
