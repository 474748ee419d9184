use std::sync::Arc;

use crate::client::core::EmergencyAnalyzer;
use crate::config::AnalyzerConfig;
use crate::resilience::{RetryConfig, RetryExecutor};
use crate::structured::{NormalizationPolicy, ResponseNormalizer};
use crate::transport::{GenerateEndpoint, HttpTransport};
use crate::Result;

/// Builder for creating analyzers with custom configuration.
///
/// Without an explicit endpoint the analyzer talks to Gemini over HTTP.
#[derive(Default)]
pub struct EmergencyAnalyzerBuilder {
    config: AnalyzerConfig,
    endpoint: Option<Arc<dyn GenerateEndpoint>>,
}

impl EmergencyAnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.endpoint.model = model.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.endpoint.api_key = Some(key.into());
        self
    }

    /// Override base URL (primarily for testing with mock servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint.base_url = url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn with_policy(mut self, policy: NormalizationPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Use a custom endpoint instead of the HTTP transport.
    pub fn with_endpoint(mut self, endpoint: Arc<dyn GenerateEndpoint>) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn build(self) -> Result<EmergencyAnalyzer> {
        self.config.validate()?;
        let endpoint: Arc<dyn GenerateEndpoint> = match self.endpoint {
            Some(endpoint) => endpoint,
            None => Arc::new(HttpTransport::new(&self.config.endpoint)?),
        };
        Ok(EmergencyAnalyzer {
            executor: RetryExecutor::new(&self.config.retry),
            normalizer: ResponseNormalizer::new(self.config.policy.clone()),
            endpoint,
            config: self.config,
        })
    }
}
