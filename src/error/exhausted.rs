//! Aggregate error raised when every model in a fallback chain has failed.

use std::fmt;

use super::RociError;

/// The failure that made the chain give up on one model.
#[derive(Debug)]
pub struct FailedAttempt {
    /// Position of the model in the chain.
    pub model_index: usize,
    pub provider: String,
    pub model_id: String,
    /// Number of attempts made on this model before it was abandoned.
    pub attempts: u32,
    /// The last error returned by the model, unchanged.
    pub error: RociError,
}

/// Every model in the chain was tried and none succeeded.
///
/// Holds one [`FailedAttempt`] per abandoned model, in chain order. Models
/// that were never reached do not appear.
#[derive(Debug)]
pub struct FallbackExhausted {
    failures: Vec<FailedAttempt>,
}

impl FallbackExhausted {
    pub fn new(failures: Vec<FailedAttempt>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[FailedAttempt] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<FailedAttempt> {
        self.failures
    }

    /// Errors in chain order.
    pub fn errors(&self) -> impl Iterator<Item = &RociError> {
        self.failures.iter().map(|f| &f.error)
    }

    /// Error from the last model in the chain.
    pub fn last_error(&self) -> Option<&RociError> {
        self.failures.last().map(|f| &f.error)
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for FallbackExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "All {} models failed:", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            write!(
                f,
                "\n[{i}] {}/{}: {}",
                failure.provider, failure.model_id, failure.error
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for FallbackExhausted {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last_error().map(|e| e as &(dyn std::error::Error + 'static))
    }
}
