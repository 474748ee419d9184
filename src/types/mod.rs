//! 类型系统模块：定义紧急分析请求、规范化指令与调用结果的核心数据类型。
//!
//! # Types Module
//!
//! Strongly-typed representations of everything that crosses the analysis boundary.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AnalysisRequest`] | Still frame, optional audio clip and target language |
//! | [`AnalyzePayload`] | Inbound `{ image, audio, language }` JSON body (base64 media) |
//! | [`EmergencyInstruction`] | Validated, policy-enforced guidance |
//! | [`DangerLevel`] | Four ordered severity tiers |
//! | [`AnalysisOutcome`] | `success`/`data` or `success: false`/`error` union |
//!
//! ## Example
//!
//! ```rust
//! use lifeguard_ai::types::{AnalysisRequest, Language};
//!
//! let request = AnalysisRequest::new(vec![0xFF, 0xD8, 0xFF], Language::French)
//!     .with_audio(vec![0x1A, 0x45, 0xDF, 0xA3]);
//! assert!(request.validate().is_ok());
//! assert!(request.has_audio());
//! ```

pub mod instruction;
pub mod language;
pub mod outcome;
pub mod request;

pub use instruction::{DangerLevel, EmergencyInstruction};
pub use language::Language;
pub use outcome::{AnalysisOutcome, ErrorSeverity, FailureKind, OutcomeError};
pub use request::{AnalysisRequest, AnalyzePayload, MediaPayload};
