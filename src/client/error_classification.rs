//! Error classification logic

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error_code::StandardErrorCode;
use crate::transport::TransportError;
use crate::Error;

/// Lower-cased substrings that mark a capacity-class failure in provider error text.
pub(crate) const TRANSIENT_MARKERS: &[&str] = &[
    "resource_exhausted",
    "resource exhausted",
    "quota",
    "overloaded",
    "service_unavailable",
    "service unavailable",
];

static STATUS_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[1-5][0-9]{2}\b").expect("status token pattern is valid"));

/// Whether `text` contains one of `codes` as a standalone three-digit token.
///
/// `"HTTP 429"` matches `429`; a project number such as `842917503112` does not match `503`.
pub(crate) fn has_status_token(text: &str, codes: &[&str]) -> bool {
    STATUS_TOKEN
        .find_iter(text)
        .any(|m| codes.contains(&m.as_str()))
}

/// Whether `text` carries one of the capacity-class markers.
pub(crate) fn has_transient_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    TRANSIENT_MARKERS.iter().any(|m| lower.contains(m)) || has_status_token(&lower, &["429", "503"])
}

/// Map an error onto the standard vocabulary from its typed signals only.
///
/// The provider status string wins over the HTTP status. Message text is never
/// consulted; `None` means the error carries no usable typed signal.
pub fn standard_code(err: &Error) -> Option<StandardErrorCode> {
    match err {
        Error::Remote { status, class, .. } => StandardErrorCode::from_provider_code(class)
            .or_else(|| known(StandardErrorCode::from_http_status(*status))),
        Error::Rpc { code, .. } => known(StandardErrorCode::from_rpc_code(*code)),
        Error::Transport(TransportError::Timeout(_)) => Some(StandardErrorCode::Timeout),
        Error::Overloaded { .. } => Some(StandardErrorCode::Overloaded),
        Error::Cancelled => Some(StandardErrorCode::Cancelled),
        _ => None,
    }
}

fn known(code: StandardErrorCode) -> Option<StandardErrorCode> {
    (code != StandardErrorCode::Unknown).then_some(code)
}

/// Determine whether a failed endpoint call should be retried.
///
/// Only capacity-class failures qualify: rate limiting, quota or resource
/// exhaustion, overload and temporary unavailability. A typed status or code
/// decides first; client and operational codes are final no matter what the
/// message says. Text markers are consulted only for server-side or unclassified
/// failures. Network and timeout failures are final.
pub fn is_transient(err: &Error) -> bool {
    let message = match err {
        Error::Remote { message, .. }
        | Error::Rpc { message, .. }
        | Error::Unknown { message, .. } => message,
        _ => return false,
    };
    match standard_code(err) {
        Some(code) if code.transient() => true,
        Some(code) if matches!(code.category(), "client" | "operational") => false,
        _ => has_transient_marker(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorContext;

    fn remote(status: u16, class: &str, message: &str) -> Error {
        Error::Remote {
            status,
            class: class.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_status_codes() {
        assert!(is_transient(&remote(429, "", "")));
        assert!(is_transient(&remote(503, "", "")));
        assert!(!is_transient(&remote(401, "", "")));
        assert!(!is_transient(&remote(400, "", "")));
        assert!(!is_transient(&remote(500, "", "")));
    }

    #[test]
    fn test_provider_class_and_message() {
        assert!(is_transient(&remote(400, "RESOURCE_EXHAUSTED", "")));
        assert!(is_transient(&remote(0, "", "The model is overloaded. Please try again later.")));
        assert!(is_transient(&remote(0, "", "Quota exceeded for metric")));
        assert!(is_transient(&remote(500, "INTERNAL", "upstream said 503, retry later")));
        assert!(!is_transient(&remote(403, "PERMISSION_DENIED", "API key not valid")));
        assert!(!is_transient(&remote(400, "", "Quota exceeded for metric")));
    }

    #[test]
    fn test_status_tokens_are_standalone() {
        assert!(has_status_token("HTTP 429 Too Many Requests", &["429"]));
        assert!(has_status_token("error(503)", &["503"]));
        assert!(!has_status_token("project 842917503112", &["503"]));
        assert!(!has_status_token("id 4290", &["429"]));
    }

    #[test]
    fn test_rpc_codes() {
        assert!(is_transient(&Error::Rpc {
            code: 8,
            message: String::new()
        }));
        assert!(!is_transient(&Error::Rpc {
            code: 16,
            message: "unauthenticated".into()
        }));
        assert!(!is_transient(&Error::Rpc {
            code: 7,
            message: "quota project 150342911 denied".into()
        }));
    }

    #[test]
    fn test_standard_code_prefers_provider_class() {
        assert_eq!(
            standard_code(&remote(400, "RESOURCE_EXHAUSTED", "")),
            Some(StandardErrorCode::ResourceExhausted)
        );
        assert_eq!(
            standard_code(&remote(403, "", "")),
            Some(StandardErrorCode::PermissionDenied)
        );
        assert_eq!(standard_code(&remote(0, "", "overloaded")), None);
        assert_eq!(
            standard_code(&Error::Overloaded { attempts: 5 }).map(|c| c.code()),
            Some("E2003")
        );
    }

    #[test]
    fn test_local_failures_never_retry() {
        assert!(!is_transient(&Error::Transport(TransportError::Timeout(
            "503 upstream".into()
        ))));
        assert!(!is_transient(&Error::validation_with_context(
            "quota",
            ErrorContext::new()
        )));
        assert!(!is_transient(&Error::Cancelled));
        assert!(is_transient(&Error::unknown_with_context(
            "service_unavailable",
            ErrorContext::new()
        )));
    }
}
