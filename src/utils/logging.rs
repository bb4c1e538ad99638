//! Structured logging and key-redaction utilities.
//!
//! This module configures the `tracing` ecosystem for the application and
//! provides a sanitizer that keeps Google API keys out of log sinks when
//! upstream URLs or error bodies are logged.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{AdvisorError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

lazy_static! {
    /// Google API keys: `AIza` followed by 35 URL-safe characters.
    static ref API_KEY_PATTERN: Regex = Regex::new(r"AIza[0-9A-Za-z_\-]{35}").unwrap();

    /// `key=` query parameters as used by the Generative Language REST API.
    static ref KEY_PARAM_PATTERN: Regex = Regex::new(r"([?&]key=)[^&\s]+").unwrap();
}

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| AdvisorError::Internal(format!("Failed to initialize logging: {}", e)))
}

/// Replaces every detected API key in `input` with a placeholder.
pub fn sanitize(input: &str) -> String {
    let redacted = API_KEY_PATTERN.replace_all(input, "[REDACTED_API_KEY]");
    KEY_PARAM_PATTERN
        .replace_all(&redacted, "${1}[REDACTED]")
        .into_owned()
}
