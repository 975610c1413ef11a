//! Lifecycle events emitted while walking a fallback chain.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::classify::Classification;
use crate::error::RociError;
use crate::provider::ModelProvider;

/// A model is about to be retried after a backoff delay.
pub struct RetryEvent<'a> {
    pub model_index: usize,
    pub model: &'a dyn ModelProvider,
    /// 1-indexed retry number for this model.
    pub attempt: u32,
    pub max_retries: u32,
    pub error: &'a RociError,
    pub delay: Duration,
}

/// The chain is giving up on one model and moving to the next.
pub struct FallbackEvent<'a> {
    pub failed_model_index: usize,
    pub failed_model: &'a dyn ModelProvider,
    pub next_model_index: usize,
    pub next_model: &'a dyn ModelProvider,
    pub error: &'a RociError,
    /// Attempts made on the failed model, including retries.
    pub attempts: u32,
}

/// A model call failed. Emitted for every failure before any retry or fallback.
pub struct ErrorEvent<'a> {
    pub model_index: usize,
    pub model: &'a dyn ModelProvider,
    pub error: &'a RociError,
    pub classification: Classification,
}

/// Callback invoked before each retry.
pub type RetryCallback = Arc<dyn Fn(&RetryEvent<'_>) + Send + Sync>;
/// Callback invoked before advancing to the next model.
pub type FallbackCallback = Arc<dyn Fn(&FallbackEvent<'_>) + Send + Sync>;
/// Callback invoked for every classified failure.
pub type ErrorCallback = Arc<dyn Fn(&ErrorEvent<'_>) + Send + Sync>;

struct ModelName<'a>(&'a dyn ModelProvider);

impl fmt::Debug for ModelName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0.provider_name(), self.0.model_id())
    }
}

impl fmt::Debug for RetryEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryEvent")
            .field("model_index", &self.model_index)
            .field("model", &ModelName(self.model))
            .field("attempt", &self.attempt)
            .field("max_retries", &self.max_retries)
            .field("error", &self.error)
            .field("delay", &self.delay)
            .finish()
    }
}

impl fmt::Debug for FallbackEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackEvent")
            .field("failed_model_index", &self.failed_model_index)
            .field("failed_model", &ModelName(self.failed_model))
            .field("next_model_index", &self.next_model_index)
            .field("next_model", &ModelName(self.next_model))
            .field("error", &self.error)
            .field("attempts", &self.attempts)
            .finish()
    }
}

impl fmt::Debug for ErrorEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorEvent")
            .field("model_index", &self.model_index)
            .field("model", &ModelName(self.model))
            .field("error", &self.error)
            .field("classification", &self.classification)
            .finish()
    }
}
