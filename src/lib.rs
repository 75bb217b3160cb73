//! # certscan
//!
//! Upload a scanned certificate or mark sheet, OCR it, and extract the
//! candidate record (roll number, names, date of birth, school, result) with
//! a hosted LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Input    png/jpg/jpeg → image, pdf → pdf, anything else → 400
//!  ├─ 2. Store    stream to <upload_dir>/<filename> (same name overwrites)
//!  ├─ 3. OCR      image: ocrs, fragments space-joined
//!  │              pdf:   pdfium → tesseract per page, pages concatenated
//!  ├─ 4. Extract  one LLM call, temperature 0, forced into CandidateFields
//!  └─ 5. Respond  DocumentRecord JSON
//! ```
//!
//! A stateless chat passthrough (`POST /chatbot/`) talks to the same provider.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use certscan::{server, AppState, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // GROQ_API_KEY is read per request by the default provider.
//!     let config = ServiceConfig::builder()
//!         .api_key(std::env::var("GROQ_API_KEY").unwrap_or_default())
//!         .build()?;
//!     let state = AppState::from_config(&config).await?;
//!     server::serve(&config, state).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `certscan` binary (clap + anyhow + dotenvy + tracing-subscriber) |
//!
//! ## Runtime Requirements
//!
//! - `tesseract` on `PATH` for PDF uploads
//! - libpdfium on the library path (or `--pdfium-library`) for PDF uploads
//! - network access on first start to fetch the ocrs models (~12 MB)

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chat;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod prompts;
pub mod record;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chat::ChatService;
pub use config::{LlmSettings, OcrSettings, ServiceConfig, ServiceConfigBuilder};
pub use error::CertScanError;
pub use pipeline::extract::TextExtractor;
pub use pipeline::input::DocumentKind;
pub use pipeline::llm::{ChatBackend, ChatRequest, OutputSchema};
pub use pipeline::ocr::OcrBackend;
pub use pipeline::render::PageRasterizer;
pub use pipeline::store::UploadStore;
pub use pipeline::structure::StructuredExtractor;
pub use process::DocumentProcessor;
pub use record::{CandidateFields, ChatPrompt, ChatReply, DocumentRecord};
pub use server::AppState;
