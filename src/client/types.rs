use serde::Serialize;

use crate::types::FailureKind;

/// Per-call statistics for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallStats {
    pub model: String,
    /// Endpoint attempts actually issued; 0 when a precondition failed.
    pub attempts: u32,
    pub duration_ms: u128,
    pub client_request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Standard code (`E2003`, ...) of the final error when it carried a typed signal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

/// Result of a text-only round trip used to verify the key and the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectivityReport {
    pub success: bool,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempts: u32,
    pub duration_ms: u128,
}
