// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{AdvisorError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

/// Environment variable the key is read from when nothing else sets it.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

impl AppConfig {
    /// Load configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (`MATH_ADVISOR_SECTION__FIELD`)
    /// 2. Config file (`path`, or `~/.math-advisor/config.toml`)
    /// 3. Defaults (lowest)
    ///
    /// `GOOGLE_API_KEY` fills `gemini.api_key` when no other source set it.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::from(Self::default_config_path()).required(false),
        };

        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix("MATH_ADVISOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AdvisorError::Config(e.to_string()))?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| AdvisorError::Config(e.to_string()))?;

        if !app_config.gemini.has_api_key() {
            app_config.gemini.api_key = std::env::var(API_KEY_ENV).ok().map(ApiKey::new);
        }

        Ok(app_config)
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".math-advisor")
            .join("config.toml")
    }
}
