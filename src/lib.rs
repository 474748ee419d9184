//! # lifeguard-ai
//!
//! 紧急情况多模态分析运行时：带抖动退避的重试调用与不可信模型输出的规范化。
//!
//! Emergency-assistance analysis runtime. A captured camera frame (and optionally
//! a short audio clip) goes to a multimodal Gemini model; the free-form answer
//! comes back as a validated, policy-enforced [`EmergencyInstruction`] ready to be
//! rendered and spoken aloud.
//!
//! ## Core Philosophy
//!
//! - **No crash paths**: every analysis resolves to an [`AnalysisOutcome`]
//! - **Capacity-aware**: rate-limit and overload errors are waited out with jittered
//!   exponential backoff, everything else fails fast
//! - **Model output is untrusted**: the danger level is coerced and safety overrides
//!   are applied regardless of what the model said
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lifeguard_ai::{AnalysisRequest, EmergencyAnalyzer, Language};
//!
//! #[tokio::main]
//! async fn main() -> lifeguard_ai::Result<()> {
//!     let analyzer = EmergencyAnalyzer::builder()
//!         .with_api_key("your-api-key")
//!         .build()?;
//!
//!     let frame = std::fs::read("frame.jpg")?;
//!     let outcome = analyzer
//!         .analyze(&AnalysisRequest::new(frame, Language::English))
//!         .await;
//!
//!     if let Some(instruction) = outcome.data() {
//!         println!("{}", instruction.narration());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`EmergencyAnalyzer`], its builder, transient-error classification |
//! | [`resilience`] | Backoff schedule and the retry executor |
//! | [`structured`] | JSON extraction and response normalization |
//! | [`types`] | Requests, instructions and outcomes |
//! | [`transport`] | Endpoint trait and the reqwest transport |
//! | [`drivers`] | Gemini `generateContent` wire format |
//! | [`prompt`] | Analysis prompt rendering |
//! | [`config`] | YAML/environment configuration |

pub mod client;
pub mod config;
pub mod drivers;
pub mod error_code;
pub mod prompt;
pub mod resilience;
pub mod structured;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{CallStats, ConnectivityReport, EmergencyAnalyzer, EmergencyAnalyzerBuilder};
pub use config::AnalyzerConfig;
pub use structured::{normalize_response, NormalizationPolicy, ResponseNormalizer};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    AnalysisOutcome, AnalysisRequest, AnalyzePayload, DangerLevel, EmergencyInstruction,
    ErrorSeverity, FailureKind, Language, OutcomeError,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
