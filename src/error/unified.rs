//! Structured error metadata reported by provider APIs.

use serde::{Deserialize, Serialize};

/// Provider-reported error code, as found in API error bodies.
///
/// Codes the chain cannot act on deserialize as [`ErrorCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidApiKey,
    InsufficientQuota,
    RateLimitExceeded,
    ModelNotFound,
    InvalidRequest,
    ContextLengthExceeded,
    ServerError,
    ServiceUnavailable,
    #[serde(other)]
    Other,
}

impl ErrorCode {
    /// The model is out of capacity for now; another model may not be.
    pub fn is_capacity(self) -> bool {
        matches!(self, Self::InsufficientQuota | Self::RateLimitExceeded)
    }

    /// A transient fault on the provider side.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::ServerError | Self::ServiceUnavailable)
    }
}

/// Broad error category, used for log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    Cancelled,
    Exhausted,
    Unknown,
}

/// Error body details attached to [`RociError::Api`](super::RociError::Api).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(default)]
    pub code: Option<ErrorCode>,
    #[serde(default, rename = "type")]
    pub provider_code: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}
