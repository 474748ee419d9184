//! Transport layer: the seam between the analyzer and the inference endpoint.
//!
//! [`GenerateEndpoint`] is what the retry executor calls once per attempt.
//! [`HttpTransport`] is the production implementation; tests substitute
//! scripted endpoints.

pub mod http;

use async_trait::async_trait;

use crate::drivers::{GenerateContentRequest, GenerateContentResponse};
use crate::Result;

pub use http::HttpTransport;

/// One generation call against a multimodal inference endpoint.
#[async_trait]
pub trait GenerateEndpoint: Send + Sync {
    /// Checks that must pass before any network call, such as a configured credential.
    fn preflight(&self) -> Result<()> {
        Ok(())
    }

    async fn generate_content(&self, req: &GenerateContentRequest)
        -> Result<GenerateContentResponse>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Sort a reqwest failure into timeout, connect or generic HTTP.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Http(err)
        }
    }
}
