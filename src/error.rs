use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "request.image", "response.actions[1]")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, a snippet of the raw text)
    pub details: Option<String>,
    /// Source of the error (e.g., "response_normalizer", "http_transport")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the emergency analysis runtime.
///
/// Errors never cross the public analysis boundary: [`crate::EmergencyAnalyzer`]
/// folds every variant into an [`crate::AnalysisOutcome`] failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Invalid response format: {message}{}", format_context(.context))]
    ResponseFormat {
        message: String,
        context: ErrorContext,
    },

    #[error("Remote error: HTTP {status} ({class}): {message}")]
    Remote {
        status: u16,
        class: String,
        message: String,
    },

    #[error("Remote error: RPC code {code}: {message}")]
    Rpc { code: i32, message: String },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    /// Transient capacity failures persisted through every attempt.
    #[error("The AI service is currently overloaded. Please try again in a few moments. ({attempts} attempts)")]
    Overloaded { attempts: u32 },

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown error: {message}{}", format_context(.context))]
    Unknown {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new response format error with structured context
    pub fn response_format_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::ResponseFormat {
            message: msg.into(),
            context,
        }
    }

    /// Create a new unknown error with structured context
    pub fn unknown_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Unknown {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Validation { context, .. }
            | Error::ResponseFormat { context, .. }
            | Error::Unknown { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The bare message without the variant prefix or context suffix.
    pub fn message(&self) -> String {
        match self {
            Error::Configuration { message, .. }
            | Error::Validation { message, .. }
            | Error::ResponseFormat { message, .. }
            | Error::Unknown { message, .. }
            | Error::Remote { message, .. }
            | Error::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Precondition failures are raised before any network call is made.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Configuration { .. } | Error::Validation { .. })
    }
}
