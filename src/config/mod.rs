//! Configuration for fallback chains (layered: code > env > file).

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RociError;
use crate::fallback::options::{
    FallbackOptions, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY, DEFAULT_MAX_RETRIES_PER_MODEL,
};

/// Serializable retry/backoff settings for a fallback chain.
///
/// Only plain values live here. Classifiers and event callbacks are attached
/// to the [`FallbackOptions`] produced by [`into_options`](Self::into_options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackConfig {
    pub max_retries_per_model: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            max_retries_per_model: DEFAULT_MAX_RETRIES_PER_MODEL,
            base_delay_ms: DEFAULT_BASE_DELAY.as_millis() as u64,
            max_delay_ms: DEFAULT_MAX_DELAY.as_millis() as u64,
            provider_name: None,
            model_id: None,
        }
    }
}

const ENV_MAX_RETRIES: &str = "ROCI_FALLBACK_MAX_RETRIES";
const ENV_BASE_DELAY_MS: &str = "ROCI_FALLBACK_BASE_DELAY_MS";
const ENV_MAX_DELAY_MS: &str = "ROCI_FALLBACK_MAX_DELAY_MS";
const ENV_PROVIDER_NAME: &str = "ROCI_FALLBACK_PROVIDER_NAME";
const ENV_MODEL_ID: &str = "ROCI_FALLBACK_MODEL_ID";

impl FallbackConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, RociError> {
        toml::from_str(source)
            .map_err(|e| RociError::Configuration(format!("invalid fallback config: {e}")))
    }

    /// Load a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RociError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source).map_err(|e| match e {
            RociError::Configuration(msg) => {
                RociError::Configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Defaults overridden by `ROCI_FALLBACK_*` environment variables.
    pub fn from_env() -> Result<Self, RociError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().with_env_overrides()
    }

    /// Apply `ROCI_FALLBACK_*` environment variables on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, RociError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RociError> {
        if let Some(value) = lookup(ENV_MAX_RETRIES) {
            self.max_retries_per_model = parse_var(ENV_MAX_RETRIES, &value)?;
        }
        if let Some(value) = lookup(ENV_BASE_DELAY_MS) {
            self.base_delay_ms = parse_var(ENV_BASE_DELAY_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_DELAY_MS) {
            self.max_delay_ms = parse_var(ENV_MAX_DELAY_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_PROVIDER_NAME) {
            self.provider_name = Some(value);
        }
        if let Some(value) = lookup(ENV_MODEL_ID) {
            self.model_id = Some(value);
        }
        Ok(self)
    }

    /// Build options for [`FallbackModel::new`](crate::fallback::FallbackModel::new).
    pub fn into_options(self) -> FallbackOptions {
        FallbackOptions::builder()
            .max_retries_per_model(self.max_retries_per_model)
            .base_delay(Duration::from_millis(self.base_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .maybe_provider_name(self.provider_name)
            .maybe_model_id(self.model_id)
            .build()
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, RociError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| RociError::Configuration(format!("{key}={value:?}: {e}")))
}
