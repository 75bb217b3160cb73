//! OCR backends.
//!
//! Two engines are used, one per input path:
//!
//! | Path  | Engine     | Fragment granularity                        |
//! |-------|------------|---------------------------------------------|
//! | image | `ocrs`     | one fragment per detected text line         |
//! | pdf   | tesseract  | one fragment per page (the whole stdout)    |
//!
//! How fragments are joined is decided by [`crate::pipeline::extract`], not
//! by the engines.

mod models;
mod ocrs_backend;
mod tesseract;

pub use models::{ensure_models, ModelSpec, DETECTION_MODEL, RECOGNITION_MODEL};
pub use ocrs_backend::OcrsBackend;
pub use tesseract::TesseractBackend;

use crate::error::CertScanError;
use image::DynamicImage;

/// A text recogniser that turns pixels into text fragments in reading order.
///
/// Implementations are blocking and are called from `spawn_blocking`.
pub trait OcrBackend: Send + Sync {
    /// Short engine name used in logs and errors.
    fn name(&self) -> &str;

    /// Whether the engine can run right now (binary installed, models loaded).
    fn is_available(&self) -> bool;

    /// Human-readable hint for making the engine available.
    fn availability_hint(&self) -> String {
        format!("{} is available", self.name())
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, CertScanError>;
}
