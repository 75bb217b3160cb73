//! Input classification: decide which OCR path a file takes.
//!
//! The decision is made from the filename alone, before anything touches the
//! upload directory, so an unsupported upload never leaves a file behind.

use crate::error::CertScanError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Which text-extraction path a document goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// png / jpg / jpeg: OCR runs directly on the pixels.
    Image,
    /// pdf: every page is rasterised, then OCR'd.
    Pdf,
}

impl DocumentKind {
    /// Extensions accepted by the upload endpoint, lower-case.
    pub const SUPPORTED_EXTENSIONS: [&'static str; 4] = ["png", "jpg", "jpeg", "pdf"];

    /// Classify a (lower- or mixed-case) extension without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" => Some(DocumentKind::Image),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }

    /// Classify a filename by the text after its last `.`.
    ///
    /// Names without a dot have no extension and are rejected.
    pub fn from_filename(file_name: &str) -> Result<Self, CertScanError> {
        let kind = extension(file_name).and_then(Self::from_extension);
        debug!("Classified '{}' as {:?}", file_name, kind);
        kind.ok_or_else(|| CertScanError::UnsupportedFileType {
            file_name: file_name.to_string(),
        })
    }
}

/// Text after the last `.` of `file_name`, if any.
pub fn extension(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Verify the `%PDF` magic bytes before handing the file to pdfium.
pub fn check_pdf_magic(path: &Path) -> Result<(), CertScanError> {
    let mut f = std::fs::File::open(path).map_err(|e| CertScanError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let mut magic = [0u8; 4];
    if f.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
        return Err(CertScanError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}
