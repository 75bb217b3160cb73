//! Pipeline stages for document extraction.
//!
//! Each submodule implements exactly one step, so each can be tested alone
//! and swapped (e.g. a different OCR engine) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ store ──▶ render ──▶ ocr ──▶ structure ──▶ DocumentRecord
//! (kind)    (disk)   (pdf only)  (text)   (llm tool)
//! ```
//!
//! 1. [`input`]   decide image vs. pdf from the filename, before any I/O
//! 2. [`store`]   stream the upload to `<upload_dir>/<filename>`
//! 3. [`render`]  rasterise PDF pages via pdfium
//! 4. [`ocr`] / [`extract`]  run the OCR engine for the document kind
//! 5. [`llm`] / [`structure`]  ask the hosted model for the candidate fields

pub mod extract;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod render;
pub mod store;
pub mod structure;
