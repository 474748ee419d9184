use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::client::builder::EmergencyAnalyzerBuilder;
use crate::client::error_classification::standard_code;
use crate::client::types::{CallStats, ConnectivityReport};
use crate::config::{AnalyzerConfig, GenerationConfig};
use crate::drivers::{ContentPart, GenerateContentRequest, GenerateContentResponse};
use crate::prompt::{build_prompt, CONNECTIVITY_PROMPT};
use crate::resilience::RetryExecutor;
use crate::structured::ResponseNormalizer;
use crate::transport::GenerateEndpoint;
use crate::types::{AnalysisOutcome, AnalysisRequest, AnalyzePayload, EmergencyInstruction, OutcomeError};
use crate::Result;

/// End-to-end analysis pipeline: request → retrying endpoint call → normalized outcome.
///
/// Calls share no mutable state; one analyzer can serve concurrent requests.
pub struct EmergencyAnalyzer {
    pub(crate) config: AnalyzerConfig,
    pub(crate) endpoint: Arc<dyn GenerateEndpoint>,
    pub(crate) executor: RetryExecutor,
    pub(crate) normalizer: ResponseNormalizer,
}

impl std::fmt::Debug for EmergencyAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmergencyAnalyzer")
            .field("config", &self.config)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl EmergencyAnalyzer {
    /// Analyzer talking to the configured HTTP endpoint.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        EmergencyAnalyzerBuilder::new().with_config(config).build()
    }

    pub fn builder() -> EmergencyAnalyzerBuilder {
        EmergencyAnalyzerBuilder::new()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        &self.config.endpoint.model
    }

    /// Run one analysis. Never fails: every error path becomes an [`AnalysisOutcome::Failure`].
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        self.analyze_with_stats(request, None).await.0
    }

    /// Like [`analyze`](Self::analyze), aborting the in-flight attempt or pending backoff
    /// as soon as `cancel` fires.
    pub async fn analyze_with_cancel(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> AnalysisOutcome {
        self.analyze_with_stats(request, Some(cancel)).await.0
    }

    /// Decode an inbound `{ image, audio, language }` payload, then analyze it.
    pub async fn analyze_payload(&self, payload: AnalyzePayload) -> AnalysisOutcome {
        match payload.into_request() {
            Ok(request) => self.analyze(&request).await,
            Err(e) => AnalysisOutcome::Failure(OutcomeError::from_error(&e)),
        }
    }

    /// Normalize already-received model text with this analyzer's policy.
    pub fn normalize(&self, raw: &str) -> AnalysisOutcome {
        self.normalizer.normalize_outcome(raw)
    }

    pub async fn analyze_with_stats(
        &self,
        request: &AnalysisRequest,
        cancel: Option<&CancellationToken>,
    ) -> (AnalysisOutcome, CallStats) {
        let client_request_id = Uuid::new_v4().to_string();
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let span = tracing::info_span!(
            "analyze",
            client_request_id = %client_request_id,
            model = %self.config.endpoint.model,
            language = request.language.as_str(),
        );
        let result = self
            .run(request, cancel, &client_request_id, &attempts)
            .instrument(span)
            .await;

        let error_code = result
            .as_ref()
            .err()
            .and_then(standard_code)
            .map(|code| code.code());
        let outcome = AnalysisOutcome::from_result(result);
        let stats = CallStats {
            model: self.config.endpoint.model.clone(),
            attempts: attempts.load(Ordering::Relaxed),
            duration_ms: start.elapsed().as_millis(),
            failure: outcome.error().map(|e| e.kind),
            error_code,
            client_request_id,
        };
        (outcome, stats)
    }

    /// Verify the key and endpoint with one text-only generation call.
    ///
    /// A missing key is reported without touching the network. Capacity failures
    /// go through the same retry budget as an analysis.
    pub async fn check_connectivity(&self) -> ConnectivityReport {
        let attempts = AtomicU32::new(0);
        let start = Instant::now();
        let result = self
            .ping(&attempts)
            .instrument(tracing::info_span!("connectivity", model = %self.config.endpoint.model))
            .await;

        let mut report = ConnectivityReport {
            model: self.config.endpoint.model.clone(),
            attempts: attempts.load(Ordering::Relaxed),
            duration_ms: start.elapsed().as_millis(),
            ..Default::default()
        };
        match result {
            Ok(response) => {
                info!(attempts = report.attempts, "connectivity check passed");
                report.success = true;
                report.text = Some(response.text);
            }
            Err(e) => {
                warn!(error = %e, "connectivity check failed");
                report.error = Some(e.message());
            }
        }
        report
    }

    async fn ping(&self, attempts: &AtomicU32) -> Result<GenerateContentResponse> {
        self.endpoint.preflight()?;

        let req = GenerateContentRequest {
            model: self.config.endpoint.model.clone(),
            parts: vec![ContentPart::text(CONNECTIVITY_PROMPT)],
            generation: GenerationConfig {
                response_mime_type: None,
                ..self.config.generation.clone()
            },
            request_id: Some(Uuid::new_v4().to_string()),
        };
        let endpoint = self.endpoint.as_ref();
        let req_ref = &req;
        self.executor
            .execute(None, move |attempt| {
                attempts.store(attempt + 1, Ordering::Relaxed);
                endpoint.generate_content(req_ref)
            })
            .await
    }

    async fn run(
        &self,
        request: &AnalysisRequest,
        cancel: Option<&CancellationToken>,
        client_request_id: &str,
        attempts: &AtomicU32,
    ) -> Result<EmergencyInstruction> {
        request.validate()?;
        self.endpoint.preflight()?;

        let gen_req = self.build_request(request, Some(client_request_id.to_string()));
        let endpoint = self.endpoint.as_ref();
        let gen_req_ref = &gen_req;

        debug!(stage = "endpoint_call", has_audio = request.has_audio(), "calling endpoint");
        let response = self
            .executor
            .execute(cancel, move |attempt| {
                attempts.store(attempt + 1, Ordering::Relaxed);
                endpoint.generate_content(gen_req_ref)
            })
            .await?;

        debug!(
            stage = "raw_received",
            bytes = response.text.len(),
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "response received"
        );

        match self.normalizer.normalize(&response.text) {
            Ok(instruction) => {
                info!(
                    stage = "done",
                    emergency_type = instruction.emergency_type.as_str(),
                    danger_level = instruction.danger_level.as_str(),
                    "analysis complete"
                );
                Ok(instruction)
            }
            Err(e) => {
                warn!(stage = "parsed", error = %e, "response normalization failed");
                Err(e)
            }
        }
    }

    /// Assemble the multimodal generation request for `request`.
    pub fn build_request(
        &self,
        request: &AnalysisRequest,
        request_id: Option<String>,
    ) -> GenerateContentRequest {
        let prompt = build_prompt(request.language, request.has_audio(), &self.config.policy);
        let mut parts = vec![
            ContentPart::text(prompt),
            ContentPart::inline(request.image.mime_type.clone(), request.image.data.clone()),
        ];
        if let Some(audio) = &request.audio {
            parts.push(ContentPart::inline(audio.mime_type.clone(), audio.data.clone()));
        }
        GenerateContentRequest {
            model: self.config.endpoint.model.clone(),
            parts,
            generation: self.config.generation.clone(),
            request_id,
        }
    }
}
