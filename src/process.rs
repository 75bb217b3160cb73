//! Upload processing: validate → save → extract → structure.

use crate::config::ServiceConfig;
use crate::error::CertScanError;
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::input::DocumentKind;
use crate::pipeline::llm::build_backend;
use crate::pipeline::ocr::{ensure_models, OcrBackend, OcrsBackend, TesseractBackend};
use crate::pipeline::render::PdfiumRasterizer;
use crate::pipeline::store::UploadStore;
use crate::pipeline::structure::StructuredExtractor;
use crate::record::DocumentRecord;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncRead;
use tracing::{info, warn};

/// Turns one uploaded document into a [`DocumentRecord`].
///
/// Shared by every request. Holds no per-request state.
pub struct DocumentProcessor {
    store: UploadStore,
    text: TextExtractor,
    fields: StructuredExtractor,
}

impl DocumentProcessor {
    pub fn new(store: UploadStore, text: TextExtractor, fields: StructuredExtractor) -> Self {
        Self {
            store,
            text,
            fields,
        }
    }

    /// Build the production pipeline: ocrs for images, pdfium + tesseract for
    /// PDFs, and the configured LLM provider for field extraction.
    ///
    /// Downloads the ocrs models on first run. A missing tesseract binary or
    /// libpdfium only logs a warning here; PDF uploads then fail with a 500.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, CertScanError> {
        let model_dir = ensure_models(&config.ocr.model_dir).await?;
        let image_ocr = tokio::task::spawn_blocking(move || OcrsBackend::load(&model_dir))
            .await
            .map_err(|e| CertScanError::Internal(format!("Model load task panicked: {}", e)))??;
        info!("OCR engine ready: {}", image_ocr.availability_hint());

        let page_ocr = TesseractBackend::new(&config.ocr.tesseract_language);
        if !page_ocr.is_available() {
            warn!("{}", page_ocr.availability_hint());
        }

        let rasterizer = PdfiumRasterizer::new(&config.ocr);
        if let Err(e) = rasterizer.probe() {
            warn!("PDF uploads will fail: {}", e);
        }

        let backend = build_backend(&config.llm, &config.llm.extraction_model)?;
        info!("Extraction model: {}", backend.name());

        Ok(Self::new(
            UploadStore::new(&config.upload_dir),
            TextExtractor::new(Arc::new(image_ocr), Arc::new(page_ocr), Arc::new(rasterizer)),
            StructuredExtractor::new(
                backend,
                config.llm.extraction_temperature,
                config.llm.max_tokens,
            ),
        ))
    }

    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    /// Process an upload streamed from `reader`.
    ///
    /// The extension is checked first. An unsupported upload is rejected
    /// without writing anything to the upload directory.
    pub async fn process<R>(
        &self,
        file_name: &str,
        reader: &mut R,
    ) -> Result<DocumentRecord, CertScanError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let start = Instant::now();
        let kind = DocumentKind::from_filename(file_name).inspect_err(|_| {
            warn!("Rejected upload '{}': unsupported file type", file_name);
        })?;

        let path = self.store.save(file_name, reader).await?;
        let text = self.text.extract(&path, kind).await?;
        let record = self.fields.extract_fields(file_name, &text).await?;

        info!("Processed '{}' in {:?}", file_name, start.elapsed());
        Ok(record)
    }

    /// Process a file already on disk, bypassing the upload store.
    pub async fn process_path(&self, path: &Path) -> Result<DocumentRecord, CertScanError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CertScanError::InvalidFileName {
                file_name: path.display().to_string(),
            })?;
        let kind = DocumentKind::from_filename(file_name)?;
        let text = self.text.extract(path, kind).await?;
        self.fields.extract_fields(file_name, &text).await
    }
}
