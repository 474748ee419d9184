//! Mock HTTP server setup for integration tests

use lifeguard_ai::resilience::RetryConfig;
use lifeguard_ai::{EmergencyAnalyzer, EmergencyAnalyzerBuilder};
use mockito::{Matcher, Mock, Server, ServerGuard};

pub const MODEL: &str = "gemini-2.0-flash";
pub const API_KEY: &str = "test-key";

pub fn generate_path(model: &str) -> String {
    format!("/v1beta/models/{}:generateContent", model)
}

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Builder pointed at the mock server with millisecond backoff.
    pub fn builder(&self) -> EmergencyAnalyzerBuilder {
        EmergencyAnalyzer::builder()
            .with_base_url(&self.base_url)
            .with_model(MODEL)
            .with_api_key(API_KEY)
            .with_retry(
                RetryConfig::default()
                    .with_max_attempts(3)
                    .with_base_delay(std::time::Duration::from_millis(1)),
            )
    }

    /// Create a mock returning a Gemini candidate whose text is `text`.
    pub async fn mock_candidate(&mut self, text: &str, hits: usize) -> Mock {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 250, "candidatesTokenCount": 40, "totalTokenCount": 290 }
        });
        self.server
            .mock("POST", generate_path(MODEL).as_str())
            .match_header("x-goog-api-key", API_KEY)
            .match_header("x-request-id", Matcher::Regex("^[0-9a-f-]{36}$".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }

    /// Create a mock for a Google-style error envelope.
    pub async fn mock_error(&mut self, status: u16, class: &str, message: &str, hits: usize) -> Mock {
        let body = serde_json::json!({
            "error": { "code": status, "message": message, "status": class }
        });
        self.server
            .mock("POST", generate_path(MODEL).as_str())
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }
}
