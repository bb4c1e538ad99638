// End-to-end tests for the upload -> package -> solve -> display flow
// Author: kelexine (https://github.com/kelexine)

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use math_advisor::config::AppConfig;
use math_advisor::error::GatewayError;
use math_advisor::models::gemini::{GenerateContentRequest, GenerateContentResponse, Part};
use math_advisor::server::{create_router, NO_IMAGE_MESSAGE, UPLOAD_TOO_LARGE_MESSAGE};
use math_advisor::solver::{GenerativeModel, Solver, SOLVE_PROMPT};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// 10x10 white RGB PNG
const WHITE_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x0a, 0x00, 0x00, 0x00, 0x0a, 0x08, 0x02, 0x00, 0x00, 0x00, 0x02,
    0x50, 0x58, 0xea, 0x00, 0x00, 0x00, 0x10, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xf8,
    0x8f, 0x17, 0x30, 0x8c, 0x4a, 0x63, 0x03, 0x00, 0xfa, 0x1e, 0x2a, 0xe4, 0x7f, 0x80, 0x77,
    0x1e, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

const BOUNDARY: &str = "math-advisor-test-boundary";

/// Stand-in for the remote model: records requests, replays one outcome.
#[derive(Clone)]
struct MockModel {
    outcome: Result<GenerateContentResponse, GatewayError>,
    requests: Arc<Mutex<Vec<GenerateContentRequest>>>,
}

impl MockModel {
    fn answering(text: &str) -> Self {
        let response = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        }))
        .unwrap();
        Self::with_outcome(Ok(response))
    }

    fn failing(err: GatewayError) -> Self {
        Self::with_outcome(Err(err))
    }

    fn with_outcome(outcome: Result<GenerateContentResponse, GatewayError>) -> Self {
        Self {
            outcome,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        self.requests.lock().unwrap().push(request);
        self.outcome.clone()
    }
}

fn app(model: &MockModel) -> Router {
    create_router(AppConfig::default(), Solver::new(model.clone())).unwrap()
}

fn multipart_body(file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// A part without a `filename`, as sent by scripted clients.
fn nameless_part_body(content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"image\"\r\n");
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn post(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_page_renders_upload_form() {
    let model = MockModel::answering("unused");
    let response = app(&model)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Upload your math problem image (jpg, jpeg, or png)"));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_white_png_is_sent_once_and_answer_displayed() {
    let model = MockModel::answering("Step-by-step breakdown:\n1. 0 = 0\n\nSolution: 0");
    let response = app(&model)
        .oneshot(post("/solve", multipart_body("white.png", "image/png", WHITE_PNG)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Analysis Complete!"));
    assert!(html.contains("Step-by-step breakdown:\n1. 0 = 0\n\nSolution: 0"));

    let requests = model.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let parts = &requests[0].contents[0].parts;
    assert_eq!(parts.len(), 2);
    match &parts[0] {
        Part::InlineData { inline_data } => {
            assert_eq!(inline_data.mime_type, "image/png");
            use base64::Engine;
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(&inline_data.data)
                .unwrap();
            assert_eq!(decoded, WHITE_PNG);
        }
        other => panic!("expected image part first, got {:?}", other),
    }
    assert!(matches!(&parts[1], Part::Text { text, .. } if text == SOLVE_PROMPT));
}

#[tokio::test]
async fn test_no_file_shows_message_without_model_call() {
    let model = MockModel::answering("unused");
    let response = app(&model)
        .oneshot(post("/solve", multipart_body("", "application/octet-stream", b"")))
        .await
        .unwrap();

    let html = body_string(response).await;
    assert!(html.contains(NO_IMAGE_MESSAGE));
    assert!(!html.contains("Analysis Complete!"));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_remote_timeout_is_displayed_as_error_text() {
    let model = MockModel::failing(GatewayError::network("deadline exceeded"));
    let response = app(&model)
        .oneshot(post("/solve", multipart_body("white.png", "image/png", WHITE_PNG)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("<div class=\"error\">Error: deadline exceeded</div>"));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_unsupported_extension_is_rejected() {
    let model = MockModel::answering("unused");
    let response = app(&model)
        .oneshot(post("/solve", multipart_body("problem.gif", "image/gif", b"GIF89a")))
        .await
        .unwrap();

    let html = body_string(response).await;
    assert!(html.contains("Unsupported file type: problem.gif"));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_nameless_non_image_part_is_rejected() {
    let model = MockModel::answering("unused");
    let response = app(&model)
        .oneshot(post("/solve", nameless_part_body("application/pdf", b"%PDF-1.4")))
        .await
        .unwrap();

    let html = body_string(response).await;
    assert!(html.contains("Unsupported file type: application/pdf"));
    assert!(!html.contains("Analysis Complete!"));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_nameless_png_is_recognised_by_content() {
    let model = MockModel::answering("Solution: 0");
    let response = app(&model)
        .oneshot(post("/solve", nameless_part_body("application/octet-stream", WHITE_PNG)))
        .await
        .unwrap();

    let html = body_string(response).await;
    assert!(html.contains("Analysis Complete!"));
    let requests = model.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(matches!(
        &requests[0].contents[0].parts[0],
        Part::InlineData { inline_data } if inline_data.mime_type == "image/png"
    ));
}

#[tokio::test]
async fn test_oversized_upload_renders_page_with_413() {
    let model = MockModel::answering("unused");
    let mut config = AppConfig::default();
    config.upload.max_bytes = 64;
    let app = create_router(config, Solver::new(model.clone())).unwrap();

    let response = app
        .oneshot(post("/solve", multipart_body("white.png", "image/png", WHITE_PNG)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let html = body_string(response).await;
    assert!(html.contains(UPLOAD_TOO_LARGE_MESSAGE));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_api_oversized_upload_is_413() {
    let model = MockModel::answering("unused");
    let mut config = AppConfig::default();
    config.upload.max_bytes = 64;
    let app = create_router(config, Solver::new(model.clone())).unwrap();

    let response = app
        .oneshot(post("/api/solve", multipart_body("white.png", "image/png", WHITE_PNG)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_api_returns_text_on_success() {
    let model = MockModel::answering("Solution: 7");
    let response = app(&model)
        .oneshot(post("/api/solve", multipart_body("p.jpg", "image/jpeg", b"\xFF\xD8\xFFdata")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, json!({"status": "ok", "text": "Solution: 7"}));
}

#[tokio::test]
async fn test_api_reports_error_kind() {
    let model = MockModel::failing(GatewayError::auth("API key not valid"));
    let response = app(&model)
        .oneshot(post("/api/solve", multipart_body("p.png", "image/png", WHITE_PNG)))
        .await
        .unwrap();

    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        body,
        json!({"status": "error", "error": {"kind": "auth", "message": "API key not valid"}})
    );
}

#[tokio::test]
async fn test_api_missing_image_is_bad_request() {
    let model = MockModel::answering("unused");
    let response = app(&model)
        .oneshot(post("/api/solve", multipart_body("", "application/octet-stream", b"")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_health_reports_missing_key() {
    let model = MockModel::answering("unused");
    let response = app(&model)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["api_key"]["status"], "warning");
}
