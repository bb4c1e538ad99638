// Gemini API client
// Author: kelexine (https://github.com/kelexine)

use crate::config::{ApiKey, GeminiConfig};
use crate::error::{AdvisorError, GatewayError, Result};
use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse};
use crate::solver::GenerativeModel;
use crate::utils::logging::sanitize;
use crate::utils::retry::{is_retryable, parse_retry_delay, with_retry};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error};
use zeroize::Zeroizing;

/// Client for the public Gemini Generative Language API.
///
/// Authenticates with an API key passed in at construction. No process-wide
/// state is involved; build one client per configuration.
pub struct GeminiClient {
    http_client: Client,
    config: GeminiConfig,
    api_key: Zeroizing<String>,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// A missing key is accepted here; requests then fail with an
    /// auth-kind error from the API.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .use_rustls_tls();

        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }

        let http_client = builder
            .build()
            .map_err(|e| AdvisorError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = Zeroizing::new(
            config
                .api_key
                .as_ref()
                .map(ApiKey::expose)
                .unwrap_or_default()
                .to_string(),
        );

        debug!("Created Gemini client for {}", config.api_base_url);

        Ok(Self {
            http_client,
            config: config.clone(),
            api_key,
        })
    }

    /// Get the API base_url
    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Call Gemini `generateContent` once.
    async fn send_once(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, GatewayError> {
        let response = self
            .http_client
            .post(url)
            .header("x-goog-api-key", self.api_key.as_str())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!(
                "Gemini API error: HTTP {} - Response body: {}",
                status,
                sanitize(&response_text)
            );
            return Err(classify_error(status.as_u16(), &response_text));
        }

        debug!(
            "Raw Gemini response (first 500 chars): {}",
            response_text.chars().take(500).collect::<String>()
        );

        let parsed: GenerateContentResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            GatewayError::unknown(format!("Response parsing error: {}", e))
        })?;

        if let Some(usage) = parsed.usage_summary() {
            debug!("Gemini usage: {}", usage);
        }

        Ok(parsed)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, GatewayError> {
        let url = self.endpoint();
        debug!("Calling generateContent API for model: {}", self.config.model);

        let started = Instant::now();
        let result = with_retry("generateContent", self.config.max_retries, || {
            self.send_once(&url, &request)
        })
        .await;

        let status = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind.as_str(),
        };
        crate::metrics::record_gemini_call(
            &self.config.model,
            status,
            started.elapsed().as_secs_f64(),
        );

        result
    }
}

/// Map a non-success HTTP response to a typed gateway error.
pub fn classify_error(status: u16, body: &str) -> GatewayError {
    let message = extract_error_message(body)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body.trim()));
    let message = sanitize(&message);

    let err = match status {
        401 | 403 => GatewayError::auth(message),
        400 if extract_error_reason(body).as_deref() == Some("API_KEY_INVALID") => {
            GatewayError::auth(message)
        }
        429 => GatewayError::quota(message),
        s if is_retryable(s) => GatewayError::network(message),
        _ => GatewayError::unknown(message),
    };

    err.with_retry_after(parse_retry_delay(body))
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

fn parse_error_detail(response_text: &str) -> Option<ErrorDetail> {
    serde_json::from_str::<ErrorResponse>(response_text)
        .ok()
        .and_then(|r| r.error)
}

/// Extract error message from API response JSON
fn extract_error_message(response_text: &str) -> Option<String> {
    let error = parse_error_detail(response_text)?;
    error.message.or(error.status)
}

/// `reason` of the first `google.rpc.ErrorInfo` detail, if any
fn extract_error_reason(response_text: &str) -> Option<String> {
    parse_error_detail(response_text)?
        .details
        .iter()
        .find_map(|d| d.get("reason").and_then(|r| r.as_str()).map(str::to_string))
}
