// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::page::{self, PageView};
use super::routes::AppState;
use crate::error::{AdvisorError, GatewayErrorKind, Result};
use crate::metrics;
use crate::solver::SOLVE_PROMPT;
use crate::vision::{
    detect_mime_type, prepare_image, resolve_mime_type, ImageFormat, UploadedImage,
};
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

pub const NO_IMAGE_MESSAGE: &str = "Please upload an image first!";

pub const UPLOAD_TOO_LARGE_MESSAGE: &str =
    "The image is too large. Please upload a smaller jpg, jpeg, or png image.";

/// Outcome of reading the upload form.
#[derive(Debug)]
pub enum UploadOutcome {
    /// A file with an accepted extension.
    File(UploadedImage),
    /// No file chosen.
    Missing,
    /// A file the upload filter does not accept.
    Rejected(String),
}

impl UploadOutcome {
    fn as_option(&self) -> Option<&UploadedImage> {
        match self {
            UploadOutcome::File(upload) => Some(upload),
            _ => None,
        }
    }
}

/// Read the `image` field of a multipart form, applying the jpg/jpeg/png filter.
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadOutcome> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Malformed upload", e))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let declared = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error("Failed to read upload", e))?;

        // browsers submit an empty part when no file was chosen
        if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
            return Ok(UploadOutcome::Missing);
        }

        match file_name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => {
                if ImageFormat::from_file_name(name).is_none() {
                    return Ok(UploadOutcome::Rejected(format!(
                        "Unsupported file type: {}. Please upload a jpg, jpeg, or png image.",
                        name
                    )));
                }
            }
            None => {
                // without a name, the declared type or the magic bytes must
                // identify a jpg or png
                let declared_ok = declared
                    .as_deref()
                    .and_then(ImageFormat::from_mime_type)
                    .is_some();
                if !declared_ok && detect_mime_type(&bytes).is_none() {
                    return Ok(UploadOutcome::Rejected(format!(
                        "Unsupported file type: {}. Please upload a jpg, jpeg, or png image.",
                        declared.as_deref().unwrap_or("unknown")
                    )));
                }
            }
        }

        let mime_type = resolve_mime_type(declared.as_deref(), file_name.as_deref(), &bytes);
        debug!("Received upload {:?} ({}, {} bytes)", file_name, mime_type, bytes.len());

        let mut upload = UploadedImage::new(mime_type, bytes);
        upload.file_name = file_name;
        return Ok(UploadOutcome::File(upload));
    }

    Ok(UploadOutcome::Missing)
}

/// Body-limit failures surface as multipart errors with status 413.
fn upload_error(context: &str, e: MultipartError) -> AdvisorError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AdvisorError::UploadTooLarge(UPLOAD_TOO_LARGE_MESSAGE.to_string())
    } else {
        AdvisorError::InvalidRequest(format!("{}: {}", context, e.body_text()))
    }
}

pub async fn index_handler() -> Html<String> {
    Html(page::render(&PageView::default()))
}

/// Handler for the page's "Solve the problem" form.
///
/// Always answers with the page; upload failures are shown in its error block.
pub async fn solve_page_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let outcome = match read_upload(multipart).await {
        Ok(outcome) => outcome,
        Err(e) => {
            metrics::record_solve("rejected");
            warn!("Upload failed: {}", e);
            let message = match &e {
                AdvisorError::UploadTooLarge(message) | AdvisorError::InvalidRequest(message) => {
                    message.clone()
                }
                other => other.to_string(),
            };
            let body = Html(page::render(&PageView::error(None, message)));
            return (e.status_code(), body).into_response();
        }
    };

    if let UploadOutcome::Rejected(message) = &outcome {
        metrics::record_solve("rejected");
        return Html(page::render(&PageView::error(None, message.clone()))).into_response();
    }

    let Some(parts) = prepare_image(outcome.as_option()) else {
        metrics::record_solve("no_image");
        return Html(page::render(&PageView::error(None, NO_IMAGE_MESSAGE))).into_response();
    };

    info!("Solving uploaded math problem with {}", state.solver.model_name());
    let preview = parts[0].to_data_uri();

    let view = match state.solver.solve(&parts, SOLVE_PROMPT).await {
        Ok(text) => {
            metrics::record_solve("success");
            PageView::answer(preview, text)
        }
        Err(e) => {
            metrics::record_solve("error");
            warn!("Solve failed ({}): {}", e.kind.as_str(), e);
            PageView::error(Some(preview), e.display_text())
        }
    };

    Html(page::render(&view)).into_response()
}

/// JSON result of `/api/solve`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SolveResponse {
    Ok { text: String },
    Error { error: SolveErrorBody },
}

#[derive(Debug, Serialize)]
pub struct SolveErrorBody {
    pub kind: GatewayErrorKind,
    pub message: String,
}

/// Handler for `/api/solve`: same flow, typed JSON result.
pub async fn solve_api_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SolveResponse>> {
    let outcome = read_upload(multipart).await?;

    if let UploadOutcome::Rejected(message) = outcome {
        metrics::record_solve("rejected");
        return Err(AdvisorError::InvalidRequest(message));
    }

    let parts = prepare_image(outcome.as_option()).ok_or_else(|| {
        metrics::record_solve("no_image");
        AdvisorError::InvalidRequest(NO_IMAGE_MESSAGE.to_string())
    })?;

    let response = match state.solver.solve(&parts, SOLVE_PROMPT).await {
        Ok(text) => {
            metrics::record_solve("success");
            SolveResponse::Ok { text }
        }
        Err(e) => {
            metrics::record_solve("error");
            SolveResponse::Error {
                error: SolveErrorBody {
                    kind: e.kind,
                    message: e.message,
                },
            }
        }
    };

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();

    let key_check = if state.config.gemini.has_api_key() {
        HealthCheck {
            status: "ok",
            message: "API key configured".to_string(),
        }
    } else {
        HealthCheck {
            status: "warning",
            message: "No API key configured; requests will fail".to_string(),
        }
    };
    let overall = if key_check.status == "ok" { "healthy" } else { "degraded" };
    checks.insert("api_key".to_string(), key_check);

    checks.insert(
        "model".to_string(),
        HealthCheck {
            status: "ok",
            message: format!(
                "{} via {}",
                state.solver.model_name(),
                state.config.gemini.api_base_url
            ),
        },
    );

    Json(HealthResponse {
        status: overall,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> Result<Response> {
    let body = metrics::gather_metrics()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}
