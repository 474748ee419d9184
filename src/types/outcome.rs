//! Caller-facing result of one analysis call.
//!
//! Every call resolves to exactly one of two wire shapes:
//!
//! ```json
//! { "success": true,  "data":  { "type": "...", "dangerLevel": "HIGH", ... } }
//! { "success": false, "error": { "message": "...", "errorType": "warning" } }
//! ```

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::instruction::EmergencyInstruction;
use crate::client::error_classification::{has_status_token, standard_code};
use crate::error_code::StandardErrorCode;
use crate::transport::TransportError;
use crate::Error;

pub const OVERLOADED_MESSAGE: &str =
    "The AI service is currently overloaded. Please try again in a few moments.";
pub const NETWORK_MESSAGE: &str = "Network error - check your internet connection";
pub const TIMEOUT_MESSAGE: &str = "Request timeout - server not responding";
pub const AUTH_MESSAGE: &str = "API authentication failed - check configuration";
pub const CANCELLED_MESSAGE: &str = "Analysis cancelled";
pub const INVALID_REQUEST_MESSAGE: &str = "AI request rejected - check configuration";

/// Coarse severity the UI uses to pick toast styling and retry affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Likely self-resolving; retrying after a short wait is reasonable.
    Warning,
    /// Needs user awareness before any retry.
    Error,
}

/// Failure category, derived internally from the underlying error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Precondition,
    Capacity,
    Network,
    Timeout,
    Authentication,
    /// The provider rejected the request itself (bad argument, unknown model).
    InvalidRequest,
    ResponseFormat,
    Cancelled,
    Other,
}

impl FailureKind {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Capacity => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Whether a fresh call is likely to succeed without user intervention.
    pub fn retry_suggested(&self) -> bool {
        matches!(self, Self::Capacity | Self::Network | Self::Timeout)
    }
}

/// Failure half of [`AnalysisOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeError {
    pub message: String,
    pub kind: FailureKind,
}

impl OutcomeError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.kind.severity()
    }

    /// Categorize an internal error into a user-facing message.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Overloaded { .. } => Self::new(FailureKind::Capacity, OVERLOADED_MESSAGE),
            Error::Cancelled => Self::new(FailureKind::Cancelled, CANCELLED_MESSAGE),
            Error::Configuration { message, .. } | Error::Validation { message, .. } => {
                Self::new(FailureKind::Precondition, message.clone())
            }
            Error::ResponseFormat { .. } => Self::new(
                FailureKind::ResponseFormat,
                format!("Failed to process AI response: {}", err),
            ),
            Error::Transport(TransportError::Timeout(_)) => {
                Self::new(FailureKind::Timeout, TIMEOUT_MESSAGE)
            }
            Error::Transport(_) => Self::new(FailureKind::Network, NETWORK_MESSAGE),
            Error::Remote { .. } | Error::Rpc { .. } => match standard_code(err) {
                Some(code) => Self::from_standard_code(code, err),
                None => categorize_message(&err.to_string()),
            },
            other => categorize_message(&other.to_string()),
        }
    }

    fn from_standard_code(code: StandardErrorCode, err: &Error) -> Self {
        use StandardErrorCode as C;
        match code {
            C::Authentication | C::PermissionDenied => {
                Self::new(FailureKind::Authentication, AUTH_MESSAGE)
            }
            // Gemini reports a bad key as INVALID_ARGUMENT.
            C::InvalidRequest if err.message().to_lowercase().contains("api key") => {
                Self::new(FailureKind::Authentication, AUTH_MESSAGE)
            }
            C::InvalidRequest | C::NotFound => Self::new(
                FailureKind::InvalidRequest,
                format!("{}: {}", INVALID_REQUEST_MESSAGE, err.message()),
            ),
            C::RateLimited | C::ResourceExhausted | C::Overloaded => {
                Self::new(FailureKind::Capacity, OVERLOADED_MESSAGE)
            }
            C::Timeout => Self::new(FailureKind::Timeout, TIMEOUT_MESSAGE),
            C::Cancelled => Self::new(FailureKind::Cancelled, CANCELLED_MESSAGE),
            C::ServerError | C::Unknown => categorize_message(&err.to_string()),
        }
    }
}

/// Pattern-match failure text, first match wins; uncategorized text passes through verbatim.
pub fn categorize_message(message: &str) -> OutcomeError {
    let m = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| m.contains(n));

    if has(&["overloaded", "quota", "resource_exhausted", "rate limit"])
        || has_status_token(&m, &["429", "503"])
    {
        OutcomeError::new(FailureKind::Capacity, OVERLOADED_MESSAGE)
    } else if has(&["enotfound", "err_network", "failed to fetch", "network", "dns"]) {
        OutcomeError::new(FailureKind::Network, NETWORK_MESSAGE)
    } else if has(&["timeout", "timed out", "deadline"]) {
        OutcomeError::new(FailureKind::Timeout, TIMEOUT_MESSAGE)
    } else if has(&["unauthenticated", "permission_denied", "api key"])
        || has_status_token(&m, &["401", "403"])
    {
        OutcomeError::new(FailureKind::Authentication, AUTH_MESSAGE)
    } else if has(&["json", "parse", "invalid response", "format"]) {
        OutcomeError::new(
            FailureKind::ResponseFormat,
            format!("Failed to process AI response: {}", message),
        )
    } else {
        OutcomeError::new(FailureKind::Other, message)
    }
}

impl Serialize for OutcomeError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("OutcomeError", 2)?;
        s.serialize_field("message", &self.message)?;
        s.serialize_field("errorType", &self.severity())?;
        s.end()
    }
}

/// Success-or-failure union returned across the public analysis boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Success(EmergencyInstruction),
    Failure(OutcomeError),
}

impl AnalysisOutcome {
    pub fn from_result(result: crate::Result<EmergencyInstruction>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(e) => Self::Failure(OutcomeError::from_error(&e)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&EmergencyInstruction> {
        match self {
            Self::Success(d) => Some(d),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&OutcomeError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<EmergencyInstruction, OutcomeError> {
        match self {
            Self::Success(d) => Ok(d),
            Self::Failure(e) => Err(e),
        }
    }
}

impl Serialize for AnalysisOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("AnalysisOutcome", 2)?;
        match self {
            Self::Success(data) => {
                s.serialize_field("success", &true)?;
                s.serialize_field("data", data)?;
            }
            Self::Failure(error) => {
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error)?;
            }
        }
        s.end()
    }
}
