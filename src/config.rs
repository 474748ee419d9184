//! Analyzer configuration
//!
//! Every field has a default, so an empty YAML document is a valid config.
//! Environment variables (`LIFEGUARD_*`) overlay file values.
//!
//! ```yaml
//! endpoint:
//!   model: gemini-2.0-flash
//!   timeout_secs: 30
//! retry:
//!   max_attempts: 5
//!   base_delay_ms: 2000
//! policy:
//!   strict_categories: false
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::resilience::RetryConfig;
use crate::structured::NormalizationPolicy;
use crate::{Error, ErrorContext, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Where and how to reach the inference endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub model: String,
    /// Explicit key; takes precedence over keyring and environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 30,
            proxy_url: None,
        }
    }
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("proxy_url", &self.proxy_url)
            .finish()
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f64,
    pub response_mime_type: Option<String>,
    pub max_output_tokens: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            response_mime_type: Some("application/json".to_string()),
            max_output_tokens: None,
        }
    }
}

/// Top-level configuration for [`crate::EmergencyAnalyzer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub endpoint: EndpointConfig,
    pub generation: GenerationConfig,
    pub retry: RetryConfig,
    pub policy: NormalizationPolicy,
}

impl AnalyzerConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid analyzer config: {}", e),
                ErrorContext::new().with_source("config"),
            )
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config"),
            )
        })?;
        Self::from_yaml_str(&text)
    }

    /// Overlay `LIFEGUARD_*` environment variables.
    ///
    /// Unparsable numeric values are ignored and the existing value is kept.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    pub(crate) fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LIFEGUARD_BASE_URL") {
            self.endpoint.base_url = v;
        }
        if let Some(v) = lookup("LIFEGUARD_MODEL") {
            self.endpoint.model = v;
        }
        if let Some(v) = lookup("LIFEGUARD_HTTP_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.endpoint.timeout_secs = v;
        }
        if let Some(v) = lookup("LIFEGUARD_PROXY_URL") {
            self.endpoint.proxy_url = Some(v);
        }
        if let Some(v) = lookup("LIFEGUARD_MAX_ATTEMPTS").and_then(|s| s.parse().ok()) {
            self.retry.max_attempts = v;
        }
        if let Some(v) = lookup("LIFEGUARD_BASE_DELAY_MS").and_then(|s| s.parse().ok()) {
            self.retry.base_delay_ms = v;
        }
        if let Some(v) = lookup("LIFEGUARD_TEMPERATURE").and_then(|s| s.parse().ok()) {
            self.generation.temperature = v;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(invalid("max_attempts must be at least 1", "retry.max_attempts"));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_ratio) {
            return Err(invalid("jitter_ratio must be within [0, 1]", "retry.jitter_ratio"));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(invalid(
                "temperature must be within [0, 2]",
                "generation.temperature",
            ));
        }
        if self.endpoint.model.trim().is_empty() {
            return Err(invalid("model must not be empty", "endpoint.model"));
        }
        url::Url::parse(&self.endpoint.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base_url: {}", e),
                ErrorContext::new()
                    .with_field_path("endpoint.base_url")
                    .with_details(self.endpoint.base_url.clone())
                    .with_source("config"),
            )
        })?;
        if self.policy.max_actions == 0 {
            return Err(invalid("max_actions must be at least 1", "policy.max_actions"));
        }
        Ok(())
    }
}

fn invalid(message: &str, field: &str) -> Error {
    Error::configuration_with_context(
        message,
        ErrorContext::new().with_field_path(field).with_source("config"),
    )
}
