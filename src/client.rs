//! Emergency analyzer: the public entry point of the runtime.
//!
//! Keep the public surface small: build an [`EmergencyAnalyzer`], hand it an
//! [`crate::types::AnalysisRequest`], get an [`crate::types::AnalysisOutcome`] back.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
pub mod error_classification;
pub mod types;

pub use builder::EmergencyAnalyzerBuilder;
pub use core::EmergencyAnalyzer;
pub use error_classification::is_transient;
pub use types::{CallStats, ConnectivityReport};
