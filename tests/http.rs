//! HTTP facade tests.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`. OCR,
//! rasterisation and the LLM are replaced with deterministic fakes so the
//! tests need no models, no libpdfium, no tesseract and no network.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use certscan::{
    server, AppState, CertScanError, ChatBackend, ChatRequest, ChatService, DocumentProcessor,
    OcrBackend, OutputSchema, PageRasterizer, ServiceConfig, StructuredExtractor, TextExtractor,
    UploadStore,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "certscan-test-boundary";

// ── Fakes ────────────────────────────────────────────────────────────────────

/// Image OCR: reports the red channel of pixel (0, 0) as two fragments.
struct PixelOcr;

impl OcrBackend for PixelOcr {
    fn name(&self) -> &str {
        "pixel"
    }
    fn is_available(&self) -> bool {
        true
    }
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, CertScanError> {
        let red = image.to_rgb8().get_pixel(0, 0).0[0];
        Ok(vec!["red".to_string(), red.to_string()])
    }
}

/// Page OCR: one fragment per page, ending in a newline like tesseract output.
struct PageOcr;

impl OcrBackend for PageOcr {
    fn name(&self) -> &str {
        "page"
    }
    fn is_available(&self) -> bool {
        true
    }
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, CertScanError> {
        let n = image.to_rgb8().get_pixel(0, 0).0[0];
        Ok(vec![format!("Page {n} text\n")])
    }
}

/// Treats the stored file as `%PDF <pages>` and renders that many 1x1 pages.
struct CountingRasterizer;

impl PageRasterizer for CountingRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, CertScanError> {
        let body = std::fs::read_to_string(pdf_path).map_err(|e| CertScanError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: e.to_string(),
        })?;
        let pages: u8 = body
            .trim()
            .strip_prefix("%PDF ")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| CertScanError::NotAPdf {
                path: pdf_path.to_path_buf(),
                magic: [0; 4],
            })?;
        Ok((1..=pages)
            .map(|n| DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([n, 0, 0]))))
            .collect())
    }
}

/// Echoes chat text and fills every field from the OCR text.
struct FakeLlm;

#[async_trait]
impl ChatBackend for FakeLlm {
    fn name(&self) -> String {
        "fake".into()
    }
    async fn complete(&self, request: &ChatRequest) -> Result<String, CertScanError> {
        Ok(format!("You said: {}", request.user))
    }
    async fn complete_structured(
        &self,
        request: &ChatRequest,
        _schema: &OutputSchema,
    ) -> Result<Value, CertScanError> {
        Ok(json!({
            "roll_no": "1234567",
            "candidate_name": "ASHA KUMARI",
            "mother_name": "SUNITA DEVI",
            "father_name": "RAMESH KUMAR",
            "date_of_birth": "04/11/2006",
            "school_name": "GOVT. SR. SEC. SCHOOL",
            "result": format!("{} chars", request.user.len()),
        }))
    }
}

/// Returns a reply missing a required field.
struct IncompleteLlm;

#[async_trait]
impl ChatBackend for IncompleteLlm {
    fn name(&self) -> String {
        "incomplete".into()
    }
    async fn complete(&self, _request: &ChatRequest) -> Result<String, CertScanError> {
        Err(CertScanError::LlmApiError {
            message: "upstream unavailable".into(),
        })
    }
    async fn complete_structured(
        &self,
        _request: &ChatRequest,
        _schema: &OutputSchema,
    ) -> Result<Value, CertScanError> {
        Ok(json!({ "roll_no": "1", "candidate_name": "A" }))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Harness {
    app: Router,
    _tmp: tempfile::TempDir,
    upload_dir: PathBuf,
}

fn harness_with(llm: Arc<dyn ChatBackend>) -> Harness {
    let tmp = tempfile::tempdir().unwrap();
    let upload_dir = tmp.path().join("uploads");
    let static_dir = tmp.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("script.js"), "console.log('hi');").unwrap();

    let config = ServiceConfig::builder()
        .upload_dir(&upload_dir)
        .static_dir(&static_dir)
        .build()
        .unwrap();

    let processor = DocumentProcessor::new(
        UploadStore::new(&upload_dir),
        TextExtractor::new(
            Arc::new(PixelOcr),
            Arc::new(PageOcr),
            Arc::new(CountingRasterizer),
        ),
        StructuredExtractor::new(llm.clone(), 0.0, 1024),
    );
    let chat = ChatService::new(llm, 0.7, 1024);
    let app = server::router(AppState::new(processor, chat), &config);

    Harness {
        app,
        _tmp: tmp,
        upload_dir,
    }
}

fn harness() -> Harness {
    harness_with(Arc::new(FakeLlm))
}

fn png_bytes(red: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([red, 0, 0])))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn multipart_request(uri: &str, field: &str, file_name: Option<&str>, data: &[u8]) -> Request<Body> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn upload(file_name: &str, data: &[u8]) -> Request<Body> {
    multipart_request("/upload/", "file", Some(file_name), data)
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chatbot/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    let value = serde_json::from_slice(&body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
    (status, value)
}

const FIELDS: [&str; 7] = [
    "roll_no",
    "candidate_name",
    "mother_name",
    "father_name",
    "date_of_birth",
    "school_name",
    "result",
];

// ── Upload ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unsupported_extension_is_rejected_and_nothing_is_stored() {
    let h = harness();
    for name in ["notes.txt", "photo.gif", "README", "archive.tar.gz"] {
        let (status, body) = send_json(&h.app, upload(name, b"hello")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{name}");
        assert_eq!(body, json!({ "detail": "Unsupported file type" }), "{name}");
    }
    let stored = std::fs::read_dir(&h.upload_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn image_upload_returns_space_joined_fragments() {
    let h = harness();
    let (status, body) = send_json(&h.app, upload("Sheet.PNG", &png_bytes(42))).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["file_name"], "Sheet.PNG");
    assert_eq!(body["content"], "red 42");
    assert!(h.upload_dir.join("Sheet.PNG").exists());
}

#[tokio::test]
async fn pdf_upload_concatenates_pages_in_order() {
    let h = harness();
    let (status, body) = send_json(&h.app, upload("marks.pdf", b"%PDF 3")).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["file_name"], "marks.pdf");
    assert_eq!(
        body["content"],
        "Page 1 text\nPage 2 text\nPage 3 text\n"
    );
}

#[tokio::test]
async fn same_name_upload_processes_the_newer_file() {
    let h = harness();
    let (_, first) = send_json(&h.app, upload("scan.jpg", &png_bytes(10))).await;
    let (status, second) = send_json(&h.app, upload("scan.jpg", &png_bytes(200))).await;

    assert_eq!(first["content"], "red 10");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["content"], "red 200");
}

#[tokio::test]
async fn successful_record_has_every_field() {
    let h = harness();
    let (status, body) = send_json(&h.app, upload("a.jpeg", &png_bytes(1))).await;

    assert_eq!(status, StatusCode::OK);
    for field in FIELDS {
        assert!(body[field].is_string(), "{field} missing in {body}");
    }
    assert_eq!(body["result"], "61 chars");
}

#[tokio::test]
async fn incomplete_extraction_is_an_opaque_500() {
    let h = harness_with(Arc::new(IncompleteLlm));
    let (status, body) = send(&h.app, upload("a.png", &png_bytes(1))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(String::from_utf8_lossy(&body), "Internal Server Error");
}

#[tokio::test]
async fn corrupt_image_is_a_500() {
    let h = harness();
    let (status, _) = send(&h.app, upload("broken.png", b"not a png")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_file_part_is_a_400() {
    let h = harness();
    let req = multipart_request("/upload/", "comment", None, b"just text");
    let (status, body) = send_json(&h.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "File is required");
}

#[tokio::test]
async fn upload_without_trailing_slash_is_served() {
    let h = harness();
    let req = multipart_request("/upload", "file", Some("x.png"), &png_bytes(7));
    let (status, body) = send_json(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "red 7");
}

#[tokio::test]
async fn path_components_in_filename_stay_inside_upload_dir() {
    let h = harness();
    let (status, body) = send_json(&h.app, upload("../../escape.png", &png_bytes(3))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(h.upload_dir.join("escape.png").exists());
    assert!(!h.upload_dir.parent().unwrap().join("escape.png").exists());
}

// ── Chat ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_chat_text_is_rejected() {
    let h = harness();
    let (status, body) = send_json(&h.app, chat_request(r#"{"text": ""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Text is required" }));
}

#[tokio::test]
async fn missing_chat_text_is_rejected() {
    let h = harness();
    let (status, _) = send_json(&h.app, chat_request("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_chat_json_is_rejected() {
    let h = harness();
    let (status, body) = send_json(&h.app, chat_request("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn chat_returns_model_reply() {
    let h = harness();
    let (status, body) = send_json(&h.app, chat_request(r#"{"text": "hello"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "You said: hello" }));
}

#[tokio::test]
async fn chat_upstream_failure_is_a_500() {
    let h = harness_with(Arc::new(IncompleteLlm));
    let (status, body) = send(&h.app, chat_request(r#"{"text": "hello"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(String::from_utf8_lossy(&body), "Internal Server Error");
}

// ── Landing page, static files, CORS ─────────────────────────────────────────

#[tokio::test]
async fn landing_page_lists_accepted_types() {
    let h = harness();
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&h.app, req).await;
    let html = String::from_utf8_lossy(&body);

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("upload-form"));
    for ext in ["png", "jpg", "jpeg", "pdf"] {
        assert!(html.contains(&format!(".{ext}")), "missing {ext}");
    }
}

#[tokio::test]
async fn static_files_are_served() {
    let h = harness();
    let req = Request::builder()
        .uri("/static/script.js")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log('hi');");
}

#[tokio::test]
async fn cors_allows_any_origin_with_credentials() {
    let h = harness();
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/chatbot/")
        .header(header::ORIGIN, "https://example.org")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let resp = h.app.clone().oneshot(req).await.unwrap();
    let headers = resp.headers();

    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://example.org"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}
