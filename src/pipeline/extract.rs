//! Text extraction: stored file → plain text.
//!
//! - **Image** uploads are decoded and passed to the image OCR engine. Its
//!   fragments are joined with a single space.
//! - **PDF** uploads are rasterised page by page and each page goes through
//!   the page OCR engine. Fragments within a page and pages within the
//!   document are concatenated with no separator, in page order.
//!
//! Both paths do blocking work and run inside `spawn_blocking`.

use crate::error::CertScanError;
use crate::pipeline::input::DocumentKind;
use crate::pipeline::ocr::OcrBackend;
use crate::pipeline::render::PageRasterizer;
use image::ImageReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the OCR path matching a document's kind.
#[derive(Clone)]
pub struct TextExtractor {
    image_ocr: Arc<dyn OcrBackend>,
    page_ocr: Arc<dyn OcrBackend>,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl TextExtractor {
    pub fn new(
        image_ocr: Arc<dyn OcrBackend>,
        page_ocr: Arc<dyn OcrBackend>,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Self {
        Self {
            image_ocr,
            page_ocr,
            rasterizer,
        }
    }

    /// Extract text from the file at `path`.
    pub async fn extract(&self, path: &Path, kind: DocumentKind) -> Result<String, CertScanError> {
        let this = self.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || this.extract_blocking(&path, kind))
            .await
            .map_err(|e| CertScanError::Internal(format!("OCR task panicked: {}", e)))?
    }

    /// Blocking implementation of [`TextExtractor::extract`].
    pub fn extract_blocking(&self, path: &Path, kind: DocumentKind) -> Result<String, CertScanError> {
        let text = match kind {
            DocumentKind::Image => self.image_text(path)?,
            DocumentKind::Pdf => self.pdf_text(path)?,
        };
        info!(
            "Extracted {} chars from {} ({:?})",
            text.len(),
            path.display(),
            kind
        );
        Ok(text)
    }

    fn image_text(&self, path: &Path) -> Result<String, CertScanError> {
        let decode_err = |detail: String| CertScanError::ImageDecode {
            path: PathBuf::from(path),
            detail,
        };
        // Sniff the format from the bytes; a PNG saved as `.jpg` is common.
        let image = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| decode_err(e.to_string()))?
            .decode()
            .map_err(|e| decode_err(e.to_string()))?;
        let fragments = self.image_ocr.recognize(&image)?;
        debug!(
            "{}: {} fragments from {}",
            self.image_ocr.name(),
            fragments.len(),
            path.display()
        );
        Ok(fragments.join(" "))
    }

    fn pdf_text(&self, path: &Path) -> Result<String, CertScanError> {
        let pages = self.rasterizer.rasterize(path)?;
        let mut text = String::new();
        for (idx, page) in pages.iter().enumerate() {
            let fragments = self.page_ocr.recognize(page)?;
            debug!(
                "{}: page {} → {} fragments",
                self.page_ocr.name(),
                idx + 1,
                fragments.len()
            );
            text.extend(fragments);
        }
        Ok(text)
    }
}
