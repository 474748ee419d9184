use async_trait::async_trait;
use keyring::Entry;
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::debug;

use super::{GenerateEndpoint, TransportError};
use crate::config::EndpointConfig;
use crate::drivers::{GeminiDriver, GenerateContentRequest, GenerateContentResponse};
use crate::{Error, ErrorContext, Result};

pub const KEYRING_SERVICE: &str = "lifeguard-ai";
pub const KEYRING_USER: &str = "gemini";

/// reqwest-backed Gemini endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl HttpTransport {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let api_key = config.api_key.clone().or_else(Self::get_api_key);

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy url: {}", e),
                    ErrorContext::new()
                        .with_field_path("endpoint.proxy_url")
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn get_api_key() -> Option<String> {
        // 1. Try Keyring
        if let Ok(entry) = Entry::new(KEYRING_SERVICE, KEYRING_USER) {
            if let Ok(key) = entry.get_password() {
                return Some(key);
            }
        }

        // 2. Try Environment Variables
        ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|v| !v.trim().is_empty())
    }
}

#[async_trait]
impl GenerateEndpoint for HttpTransport {
    fn preflight(&self) -> Result<()> {
        match &self.api_key {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(Error::configuration_with_context(
                "API key not configured",
                ErrorContext::new()
                    .with_field_path("endpoint.api_key")
                    .with_details("set GEMINI_API_KEY or store a key in the OS keyring")
                    .with_source("http_transport"),
            )),
        }
    }

    async fn generate_content(
        &self,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.preflight()?;
        let url = GeminiDriver::endpoint_url(&self.base_url, &req.model);
        let body = GeminiDriver::build_body(req);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("x-goog-api-key", key);
        }
        if let Some(id) = &req.request_id {
            request = request.header("x-request-id", id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::from_reqwest(e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(TransportError::from_reqwest(e)))?;
        debug!(status = status.as_u16(), bytes = text.len(), "endpoint responded");

        if !status.is_success() {
            return Err(GeminiDriver::parse_error(status.as_u16(), &text));
        }

        let json: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            Error::response_format_with_context(
                format!("endpoint returned non-JSON body: {}", e),
                ErrorContext::new().with_source("http_transport"),
            )
        })?;
        Ok(GeminiDriver::parse_response(&json))
    }
}
