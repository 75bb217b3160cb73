//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! Rendering is CPU-bound and pdfium keeps thread-local state, so callers run
//! [`PageRasterizer::rasterize`] inside `spawn_blocking` (see
//! [`crate::pipeline::extract`]).
//!
//! Page sizes vary wildly. `max_rendered_pixels` caps the longest edge
//! regardless of the physical page size, keeping memory bounded for posters
//! and oversized scans.

use crate::config::OcrSettings;
use crate::error::CertScanError;
use crate::pipeline::input::check_pdf_magic;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Turns a PDF on disk into one image per page, in page order.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, CertScanError>;
}

/// [`PageRasterizer`] backed by a dynamically bound libpdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    dpi: u32,
    max_pixels: u32,
    library: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            dpi: settings.dpi,
            max_pixels: settings.max_rendered_pixels,
            library: settings.pdfium_library.clone(),
        }
    }

    /// Bind to the configured library, or the system one.
    fn bind(&self) -> Result<Pdfium, CertScanError> {
        let bindings = match &self.library {
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| CertScanError::PdfiumBindingFailed(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }

    /// Check that libpdfium can be loaded. Used at startup for a clear warning.
    pub fn probe(&self) -> Result<(), CertScanError> {
        self.bind().map(|_| ())
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, CertScanError> {
        check_pdf_magic(pdf_path)?;
        let pdfium = self.bind()?;

        let document = pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                CertScanError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                CertScanError::CorruptPdf {
                    path: pdf_path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        let pages = document.pages();
        info!("PDF loaded: {} pages", pages.len());

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(self.dpi as f32 / 72.0)
            .set_maximum_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        let mut images = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                CertScanError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn non_pdf_is_rejected_before_binding() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"GIF89a").unwrap();
        let r = PdfiumRasterizer {
            dpi: 200,
            max_pixels: 4000,
            library: Some(PathBuf::from("/nonexistent/libpdfium.so")),
        };
        let err = r.rasterize(f.path()).unwrap_err();
        assert!(matches!(err, CertScanError::NotAPdf { .. }), "got {err}");
    }

    #[test]
    fn missing_library_is_a_binding_error() {
        let r = PdfiumRasterizer {
            dpi: 200,
            max_pixels: 4000,
            library: Some(PathBuf::from("/nonexistent/libpdfium.so")),
        };
        assert!(matches!(
            r.probe(),
            Err(CertScanError::PdfiumBindingFailed(_))
        ));
    }
}
