//! Tesseract OCR via its command-line interface, used for rendered PDF pages.

use super::OcrBackend;
use crate::error::CertScanError;
use image::DynamicImage;
use std::process::Command;
use tracing::debug;

const BINARY: &str = "tesseract";

/// Shells out to `tesseract <page.png> stdout -l <lang>`.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    language: String,
}

impl TesseractBackend {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn failed(detail: impl std::fmt::Display) -> CertScanError {
        CertScanError::OcrFailed {
            engine: BINARY.into(),
            detail: detail.to_string(),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new("eng")
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        BINARY
    }

    fn is_available(&self) -> bool {
        which::which(BINARY).is_ok()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "tesseract is available".to_string()
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        }
    }

    /// Returns the whole page as a single fragment, exactly as tesseract printed it.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, CertScanError> {
        let page = tempfile::Builder::new()
            .prefix("certscan-page-")
            .suffix(".png")
            .tempfile()
            .map_err(Self::failed)?;
        image
            .save_with_format(page.path(), image::ImageFormat::Png)
            .map_err(Self::failed)?;

        let output = Command::new(BINARY)
            .arg(page.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                let text = String::from_utf8_lossy(&output.stdout).into_owned();
                debug!("tesseract: {} chars", text.len());
                Ok(vec![text])
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(Self::failed(format!("tesseract failed: {}", stderr.trim())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CertScanError::OcrEngineUnavailable {
                    engine: BINARY.into(),
                    hint: self.availability_hint(),
                })
            }
            Err(e) => Err(Self::failed(e)),
        }
    }
}
