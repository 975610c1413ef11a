//! Error types for roci-fallback.

pub mod exhausted;
pub mod unified;

pub use exhausted::{FailedAttempt, FallbackExhausted};
pub use unified::{ErrorCategory, ErrorCode, ErrorDetails};

use std::error::Error as StdError;
use std::io::ErrorKind;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Words and phrases that identify connection, DNS or TLS level failures.
/// Matched case-insensitively on word boundaries.
static TRANSPORT_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:econnreset|econnrefused|etimedout|enotfound|connection (?:reset|refused|closed)|dns|tls|socket hang up|fetch failed|broken pipe)\b",
    )
    .expect("transport marker regex must compile")
});

/// Primary error type for all Roci operations.
#[derive(Error, Debug)]
pub enum RociError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
        details: Option<ErrorDetails>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Provider error: {provider}: {message}")]
    Provider {
        provider: String,
        message: String,
        retryable: bool,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Exhausted(#[from] FallbackExhausted),
}

impl RociError {
    /// Create an API error with a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: None,
            details: None,
        }
    }

    /// Create an API error with full details.
    pub fn api_with_details(
        status: u16,
        message: impl Into<String>,
        details: ErrorDetails,
    ) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: None,
            details: Some(details),
        }
    }

    /// Create a provider-reported error with an explicit retryable flag.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>, retryable: bool) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            retryable,
        }
    }

    /// HTTP-style status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Explicit retryable flag, for errors that carry one.
    pub fn retryable_flag(&self) -> Option<bool> {
        match self {
            Self::Provider { retryable, .. } => Some(*retryable),
            Self::Timeout(_) => Some(true),
            _ => None,
        }
    }

    /// Provider error code from the API error body, if one was parsed.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api {
                details: Some(details),
                ..
            } => details.code,
            _ => None,
        }
    }

    /// Whether this is a connection, DNS or TLS level failure.
    ///
    /// Detection looks at the error type first and then at the message text of
    /// the error and its sources, so wrapped transport errors are recognised too.
    pub fn is_transport_failure(&self) -> bool {
        match self {
            Self::Network(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || has_transport_marker(e)
            }
            Self::Io(e) => {
                matches!(
                    e.kind(),
                    ErrorKind::ConnectionRefused
                        | ErrorKind::ConnectionReset
                        | ErrorKind::ConnectionAborted
                        | ErrorKind::NotConnected
                        | ErrorKind::BrokenPipe
                        | ErrorKind::TimedOut
                        | ErrorKind::UnexpectedEof
                ) || has_transport_marker(e)
            }
            Self::Stream(message) => contains_transport_marker(message),
            _ => false,
        }
    }

    /// Whether this error signals cancellation of the invocation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Exhausted(_) => ErrorCategory::Exhausted,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::Io(_) if self.is_transport_failure() => ErrorCategory::Network,
            _ => ErrorCategory::Unknown,
        }
    }
}

fn contains_transport_marker(message: &str) -> bool {
    TRANSPORT_MARKERS.is_match(message)
}

fn has_transport_marker(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if contains_transport_marker(&err.to_string()) {
            return true;
        }
        current = err.source();
    }
    false
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RociError>;
