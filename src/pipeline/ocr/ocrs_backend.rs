//! Pure-Rust OCR via the `ocrs` crate, used for uploaded photos and scans.

use super::models::{DETECTION_MODEL, RECOGNITION_MODEL};
use super::OcrBackend;
use crate::error::CertScanError;
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use std::path::{Path, PathBuf};
use tracing::debug;

/// ocrs engine loaded once at startup and shared across requests.
///
/// `OcrEngine` methods take `&self`, so one instance serves concurrent
/// `spawn_blocking` calls without a lock.
pub struct OcrsBackend {
    engine: OcrEngine,
    model_dir: PathBuf,
}

impl OcrsBackend {
    /// Load the detection and recognition models from `model_dir`.
    ///
    /// Call [`super::ensure_models`] first if the models may be missing.
    pub fn load(model_dir: &Path) -> Result<Self, CertScanError> {
        let load = |filename: &str| {
            let path = model_dir.join(filename);
            rten::Model::load_file(&path).map_err(|e| CertScanError::ModelLoad {
                model: path.display().to_string(),
                detail: e.to_string(),
            })
        };
        let detection_model = load(DETECTION_MODEL.filename)?;
        let recognition_model = load(RECOGNITION_MODEL.filename)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| CertScanError::ModelLoad {
            model: "ocrs".into(),
            detail: e.to_string(),
        })?;

        Ok(Self {
            engine,
            model_dir: model_dir.to_path_buf(),
        })
    }

    fn failed(detail: impl std::fmt::Display) -> CertScanError {
        CertScanError::OcrFailed {
            engine: "ocrs".into(),
            detail: detail.to_string(),
        }
    }
}

impl OcrBackend for OcrsBackend {
    fn name(&self) -> &str {
        "ocrs"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        format!("ocrs models loaded from {}", self.model_dir.display())
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, CertScanError> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(Self::failed)?;
        let input = self.engine.prepare_input(source).map_err(Self::failed)?;

        let words = self.engine.detect_words(&input).map_err(Self::failed)?;
        let lines = self.engine.find_text_lines(&input, &words);
        let recognized = self
            .engine
            .recognize_text(&input, &lines)
            .map_err(Self::failed)?;

        let fragments: Vec<String> = recognized
            .into_iter()
            .flatten()
            .map(|line| line.to_string())
            .filter(|s| !s.trim().is_empty())
            .collect();

        debug!(
            "ocrs: {} words, {} lines, {} fragments",
            words.len(),
            lines.len(),
            fragments.len()
        );
        Ok(fragments)
    }
}
