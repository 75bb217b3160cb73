//! Configuration for the certscan service.
//!
//! Everything the service needs at startup lives in one [`ServiceConfig`],
//! built via [`ServiceConfigBuilder`]. Setters clamp values into their valid
//! range; [`ServiceConfigBuilder::build`] rejects combinations that cannot work.

use crate::error::CertScanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default Groq model for both extraction and chat.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Groq's OpenAI-compatible API root.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Top-level service configuration.
///
/// # Example
/// ```rust
/// use certscan::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .upload_dir("/var/lib/certscan/uploads")
///     .port(9000)
///     .chat_temperature(0.5)
///     .build()
///     .unwrap();
/// assert_eq!(config.port, 9000);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory uploads are written to. Created on first upload. Default: `uploads`.
    pub upload_dir: PathBuf,

    /// Directory served under `/static`. Default: `static`.
    pub static_dir: PathBuf,

    /// Bind address. Default: `0.0.0.0`.
    pub host: String,

    /// Bind port. Default: 8000.
    pub port: u16,

    /// Largest accepted request body in bytes. Default: 50 MiB.
    ///
    /// axum caps bodies at 2 MiB unless told otherwise, which is smaller than
    /// a typical phone photo of a mark sheet.
    pub max_upload_bytes: usize,

    /// Hosted LLM settings.
    pub llm: LlmSettings,

    /// OCR and rasterisation settings.
    pub ocr: OcrSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 50 * 1024 * 1024,
            llm: LlmSettings::default(),
            ocr: OcrSettings::default(),
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Hosted LLM settings shared by the structured extractor and the chat endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider name. `groq` uses the built-in Groq client; anything else is
    /// resolved through `edgequake_llm::ProviderFactory`. Default: `groq`.
    pub provider: String,

    /// Model used for structured extraction.
    pub extraction_model: String,

    /// Model used for the chat passthrough.
    pub chat_model: String,

    /// Sampling temperature for extraction. Default: 0.0 (deterministic).
    pub extraction_temperature: f32,

    /// Sampling temperature for chat. Default: 0.7.
    pub chat_temperature: f32,

    /// Maximum tokens the model may generate per reply. Default: 1024.
    pub max_tokens: usize,

    /// API root for the Groq client. Default: [`GROQ_BASE_URL`].
    pub base_url: String,

    /// API key for the Groq client. Other providers read their own env vars.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            extraction_model: DEFAULT_MODEL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            extraction_temperature: 0.0,
            chat_temperature: 0.7,
            max_tokens: 1024,
            base_url: GROQ_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("provider", &self.provider)
            .field("extraction_model", &self.extraction_model)
            .field("chat_model", &self.chat_model)
            .field("extraction_temperature", &self.extraction_temperature)
            .field("chat_temperature", &self.chat_temperature)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// OCR engine and PDF rasterisation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Where the ocrs detection/recognition models live (downloaded if absent).
    pub model_dir: PathBuf,

    /// Tesseract language code for PDF pages. Default: `eng`.
    pub tesseract_language: String,

    /// Rendering DPI for PDF pages. Range: 72–600. Default: 200.
    pub dpi: u32,

    /// Cap on either edge of a rendered page, in pixels. Default: 4000.
    pub max_rendered_pixels: u32,

    /// Explicit libpdfium path. If None, the system library is used.
    pub pdfium_library: Option<PathBuf>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            tesseract_language: "eng".to_string(),
            dpi: 200,
            max_rendered_pixels: 4000,
            pdfium_library: None,
        }
    }
}

/// `<data_dir>/certscan/models`, falling back to `./models`.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("certscan").join("models"))
        .unwrap_or_else(|| PathBuf::from("models"))
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.static_dir = dir.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.config.llm.provider = name.into();
        self
    }

    pub fn extraction_model(mut self, model: impl Into<String>) -> Self {
        self.config.llm.extraction_model = model.into();
        self
    }

    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.config.llm.chat_model = model.into();
        self
    }

    pub fn extraction_temperature(mut self, t: f32) -> Self {
        self.config.llm.extraction_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn chat_temperature(mut self, t: f32) -> Self {
        self.config.llm.chat_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.llm.max_tokens = n;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.llm.base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.llm.api_key = Some(key.into());
        self
    }

    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.ocr.model_dir = dir.into();
        self
    }

    pub fn tesseract_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr.tesseract_language = lang.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.ocr.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.ocr.max_rendered_pixels = px.max(100);
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ocr.pdfium_library = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, CertScanError> {
        let c = &self.config;
        if c.llm.provider.trim().is_empty() {
            return Err(CertScanError::InvalidConfig(
                "LLM provider name must not be empty".into(),
            ));
        }
        if c.llm.extraction_model.trim().is_empty() || c.llm.chat_model.trim().is_empty() {
            return Err(CertScanError::InvalidConfig(
                "Model names must not be empty".into(),
            ));
        }
        if c.llm.max_tokens == 0 {
            return Err(CertScanError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(CertScanError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if c.ocr.tesseract_language.trim().is_empty() {
            return Err(CertScanError::InvalidConfig(
                "Tesseract language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
