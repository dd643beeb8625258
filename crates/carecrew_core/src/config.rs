//! Runtime configuration for core callers.
//!
//! # Responsibility
//! - Collect data directory, log level and extraction service settings.
//! - Read overrides from the process environment.
//!
//! # Invariants
//! - The API key never appears in `Debug` output.
//! - Unset variables fall back to defaults; malformed values are rejected.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DATA_DIR: &str = ".carecrew";
/// File name of the durable store inside the data directory.
pub const STORE_FILE_NAME: &str = "carecrew.sqlite3";

const ENV_DATA_DIR: &str = "CARECREW_DATA_DIR";
const ENV_LOG_LEVEL: &str = "CARECREW_LOG_LEVEL";
const ENV_MODEL: &str = "CARECREW_GEMINI_MODEL";
const ENV_ENDPOINT: &str = "CARECREW_GEMINI_ENDPOINT";
const ENV_TIMEOUT: &str = "CARECREW_GEMINI_TIMEOUT_SECS";
const ENV_API_KEYS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { var: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { var, value } => {
                write!(f, "`{var}` must be a positive integer, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Extraction service settings.
#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// Opaque credential; empty means requests will be rejected upstream.
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Debug for GeminiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub gemini: GeminiConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: default_log_level().to_string(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = non_empty(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            config.log_level = level.trim().to_string();
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            config.gemini.model = model.trim().to_string();
        }
        if let Some(endpoint) = non_empty(ENV_ENDPOINT) {
            config.gemini.endpoint = endpoint.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = non_empty(ENV_TIMEOUT) {
            config.gemini.timeout_secs = match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: ENV_TIMEOUT,
                        value: raw,
                    })
                }
            };
        }
        if let Some(key) = ENV_API_KEYS.iter().find_map(|name| non_empty(*name)) {
            config.gemini.api_key = key.trim().to_string();
        }

        Ok(config)
    }

    /// Path of the durable store file.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}
