//! Deciding what to do with a failed attempt.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::RociError;

/// What the fallback chain does with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Classification {
    /// Retry the same model after a backoff delay, if its budget allows.
    Retry,
    /// Move on to the next model without retrying.
    Fallback,
    /// Give up and return the error unchanged.
    Throw,
}

/// Pluggable classification policy.
///
/// Closures of the form `Fn(&RociError) -> Classification` implement this
/// trait, so a custom policy can be passed without a named type.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: &RociError) -> Classification;
}

impl<F> ErrorClassifier for F
where
    F: Fn(&RociError) -> Classification + Send + Sync,
{
    fn classify(&self, error: &RociError) -> Classification {
        self(error)
    }
}

/// The policy used when no classifier is configured. See [`classify_error`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl ErrorClassifier for DefaultClassifier {
    fn classify(&self, error: &RociError) -> Classification {
        classify_error(error)
    }
}

/// Default classification policy.
///
/// * 429: fall back.
/// * 5xx: transient server fault, retry.
/// * explicit retryable flag: retry.
/// * other 4xx: the request itself is at fault, throw.
/// * in-band provider code: quota or rate limit falls back, overload retries.
/// * any other status: throw.
/// * connection, DNS or TLS failure: retry.
/// * anything unrecognised: throw.
pub fn classify_error(error: &RociError) -> Classification {
    let status = error.status_code();
    match status {
        Some(429) => return Classification::Fallback,
        Some(s) if s >= 500 => return Classification::Retry,
        _ => {}
    }
    if error.retryable_flag() == Some(true) {
        return Classification::Retry;
    }
    if matches!(status, Some(400..=499)) {
        return Classification::Throw;
    }
    // Errors reported in-band, e.g. an error object in a 200 body.
    match error.error_code() {
        Some(code) if code.is_capacity() => return Classification::Fallback,
        Some(code) if code.is_transient() => return Classification::Retry,
        _ => {}
    }
    if status.is_some() {
        return Classification::Throw;
    }
    if error.is_transport_failure() {
        return Classification::Retry;
    }
    Classification::Throw
}
