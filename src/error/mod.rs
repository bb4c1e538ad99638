// Error types for math-advisor
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Coarse failure category of a call to the remote model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayErrorKind {
    /// Connection refused, DNS failure, timeout, broken body.
    Network,
    /// Missing, invalid or unauthorized API key.
    Auth,
    /// Rate limit or quota exhaustion (HTTP 429).
    Quota,
    /// Anything else, including blocked prompts and unparseable responses.
    Unknown,
}

impl GatewayErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayErrorKind::Network => "network",
            GatewayErrorKind::Auth => "auth",
            GatewayErrorKind::Quota => "quota",
            GatewayErrorKind::Unknown => "unknown",
        }
    }
}

/// Failure of the AI gateway. `Display` yields only the message so the
/// user-facing form is `Error: <message>`.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    /// Server-suggested wait before retrying, from Google's `RetryInfo`.
    pub retry_after: Option<Duration>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Auth, message)
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Quota, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Unknown, message)
    }

    pub fn with_retry_after(mut self, delay: Option<Duration>) -> Self {
        self.retry_after = delay;
        self
    }

    /// Only transient failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            GatewayErrorKind::Network | GatewayErrorKind::Quota
        )
    }

    /// The text shown to the user in place of an answer.
    pub fn display_text(&self) -> String {
        format!("Error: {}", self.message)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::unknown(format!("Response parsing error: {}", e))
        } else if e.is_builder() {
            // the request never left; an API key that is not a valid header
            // value is the usual cause
            GatewayError::auth(format!(
                "Could not build the request, check that the API key has no spaces or line breaks ({})",
                e
            ))
        } else {
            // timeouts, connect failures and body errors all mean the
            // service could not be reached reliably
            GatewayError::network(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload too large: {0}")]
    UploadTooLarge(String),

    #[error("Gemini API error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdvisorError {
    /// HTTP status and error type reported for this error.
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AdvisorError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            AdvisorError::UploadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "request_too_large"),
            AdvisorError::Config(_) | AdvisorError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            AdvisorError::Gateway(e) => match e.kind {
                GatewayErrorKind::Quota => (StatusCode::TOO_MANY_REQUESTS, "rate_limit_error"),
                GatewayErrorKind::Auth => (StatusCode::BAD_GATEWAY, "authentication_error"),
                _ => (StatusCode::BAD_GATEWAY, "api_error"),
            },
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}

// Convert AdvisorError to HTTP responses for Axum
impl IntoResponse for AdvisorError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.classify();

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
