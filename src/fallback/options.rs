//! Configuration for a [`FallbackModel`](super::FallbackModel).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bon::Builder;

use super::classify::ErrorClassifier;
use super::events::{ErrorCallback, FallbackCallback, RetryCallback};
use crate::util::backoff::JitterSource;

pub const DEFAULT_MAX_RETRIES_PER_MODEL: u32 = 0;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1_000);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(30_000);

/// Retry budget, backoff, classification policy, observers and identity
/// of a fallback chain.
///
/// ```
/// use std::time::Duration;
/// use roci_fallback::fallback::FallbackOptions;
///
/// let options = FallbackOptions::builder()
///     .max_retries_per_model(2)
///     .base_delay(Duration::from_millis(250))
///     .model_id("primary-with-backup")
///     .build();
/// assert_eq!(options.max_delay, Duration::from_secs(30));
/// ```
#[derive(Clone, Builder)]
pub struct FallbackOptions {
    /// Retries per model after the first attempt. `0` means any retryable
    /// failure moves straight to the next model.
    #[builder(default = DEFAULT_MAX_RETRIES_PER_MODEL)]
    pub max_retries_per_model: u32,
    #[builder(default = DEFAULT_BASE_DELAY)]
    pub base_delay: Duration,
    #[builder(default = DEFAULT_MAX_DELAY)]
    pub max_delay: Duration,
    /// Defaults to [`DefaultClassifier`](super::DefaultClassifier).
    pub classifier: Option<Arc<dyn ErrorClassifier>>,
    /// Defaults to [`ThreadRngJitter`](crate::util::backoff::ThreadRngJitter).
    pub jitter: Option<Arc<dyn JitterSource>>,
    pub on_retry: Option<RetryCallback>,
    pub on_fallback: Option<FallbackCallback>,
    pub on_error: Option<ErrorCallback>,
    /// Provider name reported by the chain. Defaults to `"fallback"`.
    #[builder(into)]
    pub provider_name: Option<String>,
    /// Model id reported by the chain. Defaults to the member ids joined by `" -> "`.
    #[builder(into)]
    pub model_id: Option<String>,
}

impl Default for FallbackOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for FallbackOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackOptions")
            .field("max_retries_per_model", &self.max_retries_per_model)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("classifier", &self.classifier.as_ref().map(|_| ".."))
            .field("jitter", &self.jitter.as_ref().map(|_| ".."))
            .field("on_retry", &self.on_retry.is_some())
            .field("on_fallback", &self.on_fallback.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("provider_name", &self.provider_name)
            .field("model_id", &self.model_id)
            .finish()
    }
}
