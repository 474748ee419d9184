//! Structured response handling for lifeguard-ai.
//!
//! Turns free-form model output into a validated [`crate::types::EmergencyInstruction`]:
//! - `extract`: fence stripping and outer-brace JSON extraction
//! - `NormalizationPolicy`: category vocabulary and safety overrides
//! - `ResponseNormalizer`: validation plus policy enforcement
//!
//! # Examples
//!
//! ```
//! use lifeguard_ai::structured::normalize_response;
//! use lifeguard_ai::types::DangerLevel;
//!
//! let raw = "```json\n{\"type\":\"Not an Emergency\",\"dangerLevel\":\"CRITICAL\",\"actions\":[]}\n```";
//! let outcome = normalize_response(raw);
//!
//! assert_eq!(outcome.data().unwrap().danger_level, DangerLevel::Low);
//! ```

pub mod extract;
pub mod normalize;
pub mod policy;

pub use extract::{extract_json_object, outer_braces, strip_code_fences};
pub use normalize::{normalize_response, ResponseNormalizer};
pub use policy::NormalizationPolicy;
