//! 标准错误码：将 HTTP 状态、Google RPC 状态串与 gRPC 数值码归一为统一词汇。
//!
//! Standard error codes for upstream inference failures.
//!
//! Upstream failures surface in three shapes: numeric HTTP statuses, Google RPC
//! status strings inside JSON error bodies (`"RESOURCE_EXHAUSTED"`), and numeric
//! gRPC codes (`8`). This module maps all of them onto one closed vocabulary so
//! the retry executor can make a single transient/permanent decision.
//!
//! | Prefix | Category    | Description                          |
//! |--------|-------------|--------------------------------------|
//! | E1xxx  | client      | Request-side errors                  |
//! | E2xxx  | capacity    | Rate limit, quota and overload       |
//! | E3xxx  | server      | Provider-side errors                 |
//! | E4xxx  | operational | Timeouts and cancellation            |
//! | E9xxx  | unknown     | Catch-all / unclassified             |
//!
//! ## Example
//!
//! ```rust
//! use lifeguard_ai::error_code::StandardErrorCode;
//!
//! let code = StandardErrorCode::from_provider_code("RESOURCE_EXHAUSTED").unwrap();
//! assert_eq!(code.code(), "E2002");
//! assert!(code.transient());
//! assert_eq!(code.category(), "capacity");
//! ```

use std::fmt;

/// Canonical classification of an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardErrorCode {
    /// E1001: Malformed request, invalid parameters, or failed precondition
    InvalidRequest,
    /// E1002: Invalid, expired, or missing API key
    Authentication,
    /// E1003: Valid credentials but insufficient permissions
    PermissionDenied,
    /// E1004: Requested model or endpoint does not exist
    NotFound,
    /// E2001: Request rate limit exceeded
    RateLimited,
    /// E2002: Quota or resource exhausted
    ResourceExhausted,
    /// E2003: Service overloaded or temporarily unavailable
    Overloaded,
    /// E3001: Internal server error on provider side
    ServerError,
    /// E4001: Deadline exceeded before a response arrived
    Timeout,
    /// E4002: Request was cancelled
    Cancelled,
    /// E9999: Error could not be classified
    Unknown,
}

impl StandardErrorCode {
    /// Returns the canonical code string (e.g., `"E2001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "E1001",
            Self::Authentication => "E1002",
            Self::PermissionDenied => "E1003",
            Self::NotFound => "E1004",
            Self::RateLimited => "E2001",
            Self::ResourceExhausted => "E2002",
            Self::Overloaded => "E2003",
            Self::ServerError => "E3001",
            Self::Timeout => "E4001",
            Self::Cancelled => "E4002",
            Self::Unknown => "E9999",
        }
    }

    /// Capacity-class failures: the only ones the executor waits out and retries.
    #[inline]
    pub fn transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ResourceExhausted | Self::Overloaded
        )
    }

    /// Returns the category: `"client"`, `"capacity"`, `"server"`, `"operational"`, or `"unknown"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequest | Self::Authentication | Self::PermissionDenied | Self::NotFound => {
                "client"
            }
            Self::RateLimited | Self::ResourceExhausted | Self::Overloaded => "capacity",
            Self::ServerError => "server",
            Self::Timeout | Self::Cancelled => "operational",
            Self::Unknown => "unknown",
        }
    }

    /// Maps a provider status/type string to the corresponding `StandardErrorCode`.
    ///
    /// Accepts Google RPC status names (`"RESOURCE_EXHAUSTED"`, `"UNAVAILABLE"`),
    /// their lowercase forms, and the standard names above. Matching is case-insensitive.
    pub fn from_provider_code(provider_code: &str) -> Option<Self> {
        let code = match provider_code.trim().to_ascii_lowercase().as_str() {
            "invalid_argument" | "invalid_request" | "failed_precondition" | "out_of_range" => {
                Self::InvalidRequest
            }
            "unauthenticated" | "authentication" | "invalid_api_key" => Self::Authentication,
            "permission_denied" => Self::PermissionDenied,
            "not_found" => Self::NotFound,
            "rate_limited" | "rate_limit_exceeded" => Self::RateLimited,
            "resource_exhausted" | "quota_exceeded" | "insufficient_quota" => {
                Self::ResourceExhausted
            }
            "unavailable" | "service_unavailable" | "overloaded" | "overloaded_error" => {
                Self::Overloaded
            }
            "internal" | "server_error" => Self::ServerError,
            "deadline_exceeded" | "timeout" => Self::Timeout,
            "cancelled" | "aborted" => Self::Cancelled,
            _ => return None,
        };
        Some(code)
    }

    /// Maps a numeric gRPC status code to the corresponding `StandardErrorCode`.
    pub fn from_rpc_code(code: i32) -> Self {
        match code {
            1 => Self::Cancelled,
            3 | 9 | 11 => Self::InvalidRequest,
            4 => Self::Timeout,
            5 => Self::NotFound,
            7 => Self::PermissionDenied,
            8 => Self::ResourceExhausted,
            13 => Self::ServerError,
            14 => Self::Overloaded,
            16 => Self::Authentication,
            _ => Self::Unknown,
        }
    }

    /// Maps an HTTP status code to the most likely `StandardErrorCode`.
    ///
    /// Status codes without a standard mapping return `StandardErrorCode::Unknown`.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 | 504 => Self::Timeout,
            429 => Self::RateLimited,
            500 => Self::ServerError,
            503 => Self::Overloaded,
            529 => Self::Overloaded, // non-standard but used by some gateways
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for StandardErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_statuses_are_transient() {
        assert!(StandardErrorCode::from_http_status(429).transient());
        assert!(StandardErrorCode::from_http_status(503).transient());
        assert!(!StandardErrorCode::from_http_status(500).transient());
        assert!(!StandardErrorCode::from_http_status(401).transient());
    }

    #[test]
    fn test_rpc_codes() {
        assert_eq!(StandardErrorCode::from_rpc_code(8), StandardErrorCode::ResourceExhausted);
        assert_eq!(StandardErrorCode::from_rpc_code(14), StandardErrorCode::Overloaded);
        assert_eq!(StandardErrorCode::from_rpc_code(16), StandardErrorCode::Authentication);
        assert_eq!(StandardErrorCode::from_rpc_code(99), StandardErrorCode::Unknown);
    }

    #[test]
    fn test_provider_codes_are_case_insensitive() {
        assert_eq!(
            StandardErrorCode::from_provider_code("UNAVAILABLE"),
            Some(StandardErrorCode::Overloaded)
        );
        assert_eq!(
            StandardErrorCode::from_provider_code("resource_exhausted"),
            Some(StandardErrorCode::ResourceExhausted)
        );
        assert_eq!(StandardErrorCode::from_provider_code("teapot"), None);
    }
}
