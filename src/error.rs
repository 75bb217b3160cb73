//! Error types for certscan.
//!
//! A single fatal error type, [`CertScanError`], covers every way a request
//! can fail. The HTTP facade only needs to know one thing about an error:
//! whether the caller can fix it by resubmitting different input
//! ([`CertScanError::is_client_error`]) or whether it is an upstream / storage
//! failure that becomes an opaque 500.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the certscan library.
#[derive(Debug, Error)]
pub enum CertScanError {
    // ── Client input errors ───────────────────────────────────────────────
    /// Extension is not one of png, jpg, jpeg, pdf.
    #[error("Unsupported file type")]
    UnsupportedFileType { file_name: String },

    /// Chat request carried no text.
    #[error("Text is required")]
    EmptyChatText,

    /// Multipart body had no file part.
    #[error("File is required")]
    MissingUpload,

    /// The client-supplied filename has no usable final component (e.g. `..`).
    #[error("Invalid file name '{file_name}'")]
    InvalidFileName { file_name: String },

    /// Request body could not be decoded.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ── Storage errors ────────────────────────────────────────────────────
    /// Could not create the upload directory or write the uploaded file.
    #[error("Failed to store upload at '{path}': {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// Image could not be opened or decoded.
    #[error("Failed to read image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    /// The OCR engine is not installed or its models are missing.
    #[error("OCR engine '{engine}' is not available.\n{hint}")]
    OcrEngineUnavailable { engine: String, hint: String },

    /// Loading or downloading an OCR model failed.
    #[error("Failed to load OCR model '{model}': {detail}")]
    ModelLoad { model: String, detail: String },

    /// The OCR engine ran but failed.
    #[error("OCR failed ({engine}): {detail}")]
    OcrFailed { engine: String, detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The file does not start with the `%PDF` magic bytes.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password; uploads have no way to supply one.
    #[error("PDF '{path}' is encrypted and requires a password")]
    PasswordRequired { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Install libpdfium on the library path or pass --pdfium-library /path/to/libpdfium."
    )]
    PdfiumBindingFailed(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error or could not be reached.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The model's reply did not conform to the requested schema.
    #[error("LLM reply does not match the '{schema}' schema: {detail}")]
    SchemaViolation { schema: String, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CertScanError {
    /// Whether the caller caused this error and can recover by resubmitting.
    ///
    /// Client errors become HTTP 400; everything else is an opaque 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CertScanError::UnsupportedFileType { .. }
                | CertScanError::EmptyChatText
                | CertScanError::MissingUpload
                | CertScanError::InvalidFileName { .. }
                | CertScanError::InvalidRequest(_)
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CertScanError>;
