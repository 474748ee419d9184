//! HTTP transport against a mock Gemini server.

mod common;

use common::mock_server::{generate_path, MockServerFixture, MODEL};
use common::FIRE_JSON;
use lifeguard_ai::config::EndpointConfig;
use lifeguard_ai::drivers::{ContentPart, GenerateContentRequest};
use lifeguard_ai::prompt::CONNECTIVITY_PROMPT;
use lifeguard_ai::transport::{GenerateEndpoint, HttpTransport, TransportError};
use lifeguard_ai::types::outcome::{NETWORK_MESSAGE, OVERLOADED_MESSAGE};
use lifeguard_ai::{AnalysisRequest, DangerLevel, Error, FailureKind, Language};
use mockito::Matcher;

fn frame() -> AnalysisRequest {
    AnalysisRequest::new(b"jpeg-bytes".to_vec(), Language::French).with_audio(b"webm-bytes".to_vec())
}

#[tokio::test]
async fn test_successful_analysis_over_http() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_candidate(FIRE_JSON, 1).await;

    let analyzer = fixture.builder().build().unwrap();
    let outcome = analyzer.analyze(&frame()).await;

    mock.assert_async().await;
    let data = outcome.data().expect("should succeed");
    assert_eq!(data.danger_level, DangerLevel::High);
    assert_eq!(data.actions, vec!["Evacuate", "Call emergency services"]);
}

#[tokio::test]
async fn test_request_body_shape() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", generate_path(MODEL).as_str())
        .match_body(Matcher::PartialJson(serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {},
                    { "inlineData": { "mimeType": "image/jpeg", "data": "anBlZy1ieXRlcw==" } },
                    { "inlineData": { "mimeType": "audio/webm", "data": "d2VibS1ieXRlcw==" } }
                ]
            }],
            "generationConfig": { "temperature": 0.1, "responseMimeType": "application/json" }
        })))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": FIRE_JSON }] } }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let analyzer = fixture.builder().build().unwrap();
    assert!(analyzer.analyze(&frame()).await.is_success());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_overloaded_over_http_uses_full_budget() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_error(503, "UNAVAILABLE", "The model is overloaded. Please try again later.", 3)
        .await;

    let analyzer = fixture.builder().build().unwrap();
    let (outcome, stats) = analyzer.analyze_with_stats(&frame(), None).await;

    mock.assert_async().await;
    assert_eq!(stats.attempts, 3);
    assert_eq!(outcome.error().map(|e| e.message.as_str()), Some(OVERLOADED_MESSAGE));
}

#[tokio::test]
async fn test_bad_request_fails_once() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_error(400, "INVALID_ARGUMENT", "API key not valid. Please pass a valid API key.", 1)
        .await;

    let analyzer = fixture.builder().build().unwrap();
    let outcome = analyzer.analyze(&frame()).await;

    mock.assert_async().await;
    assert_eq!(outcome.error().map(|e| e.kind), Some(FailureKind::Authentication));
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_candidate(FIRE_JSON, 0).await;

    let analyzer = fixture.builder().with_api_key("").build().unwrap();
    let outcome = analyzer.analyze(&frame()).await;

    mock.assert_async().await;
    assert_eq!(outcome.error().map(|e| e.kind), Some(FailureKind::Precondition));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let analyzer = lifeguard_ai::EmergencyAnalyzer::builder()
        .with_base_url("http://127.0.0.1:1")
        .with_api_key("test-key")
        .build()
        .unwrap();
    let (outcome, stats) = analyzer.analyze_with_stats(&frame(), None).await;

    let err = outcome.error().expect("should fail");
    assert_eq!(err.kind, FailureKind::Network);
    assert_eq!(err.message, NETWORK_MESSAGE);
    assert_eq!(stats.attempts, 1);
}

#[tokio::test]
async fn test_transport_maps_error_envelope() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_error(429, "RESOURCE_EXHAUSTED", "Resource has been exhausted", 1)
        .await;

    let transport = HttpTransport::new(&EndpointConfig {
        base_url: fixture.base_url.clone(),
        api_key: Some("test-key".into()),
        ..Default::default()
    })
    .unwrap();
    let req = GenerateContentRequest {
        model: MODEL.into(),
        parts: vec![ContentPart::text("ping")],
        generation: Default::default(),
        request_id: None,
    };

    match transport.generate_content(&req).await {
        Err(Error::Remote {
            status,
            class,
            message,
        }) => {
            assert_eq!(status, 429);
            assert_eq!(class, "RESOURCE_EXHAUSTED");
            assert_eq!(message, "Resource has been exhausted");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_success_body_is_format_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("POST", generate_path(MODEL).as_str())
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let transport = HttpTransport::new(&EndpointConfig {
        base_url: fixture.base_url.clone(),
        api_key: Some("test-key".into()),
        ..Default::default()
    })
    .unwrap();
    let req = GenerateContentRequest {
        model: MODEL.into(),
        parts: vec![ContentPart::text("ping")],
        generation: Default::default(),
        request_id: None,
    };
    let err = transport.generate_content(&req).await.unwrap_err();
    assert!(matches!(err, Error::ResponseFormat { .. }));
    assert!(!matches!(err, Error::Transport(TransportError::Timeout(_))));
}

#[tokio::test]
async fn test_connectivity_check_round_trip() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", generate_path(MODEL).as_str())
        .match_header("x-goog-api-key", common::mock_server::API_KEY)
        .match_body(Matcher::PartialJson(serde_json::json!({
            "contents": [{ "parts": [{ "text": CONNECTIVITY_PROMPT }] }]
        })))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "Machines learn patterns from data." }] } }]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let analyzer = fixture.builder().build().unwrap();
    let report = analyzer.check_connectivity().await;

    mock.assert_async().await;
    assert!(report.success);
    assert_eq!(report.text.as_deref(), Some("Machines learn patterns from data."));
    assert_eq!(report.model, MODEL);
    assert_eq!(report.attempts, 1);
    let wire = serde_json::to_value(&report).unwrap();
    assert!(wire.get("error").is_none());
}

#[tokio::test]
async fn test_connectivity_check_without_key_skips_network() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_candidate("unused", 0).await;

    let analyzer = fixture.builder().with_api_key("").build().unwrap();
    let report = analyzer.check_connectivity().await;

    mock.assert_async().await;
    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some("API key not configured"));
    assert_eq!(report.attempts, 0);
}

#[tokio::test]
async fn test_connectivity_check_reports_rejected_key() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_error(400, "INVALID_ARGUMENT", "API key not valid. Please pass a valid API key.", 1)
        .await;

    let report = fixture.builder().build().unwrap().check_connectivity().await;

    mock.assert_async().await;
    assert!(!report.success);
    assert_eq!(
        report.error.as_deref(),
        Some("API key not valid. Please pass a valid API key.")
    );
}
