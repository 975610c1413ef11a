//! Fallback chains: one logical model backed by an ordered list of providers.
//!
//! A [`FallbackModel`] tries its models in order. Each failure is classified
//! (see [`classify_error`]): retryable failures are retried on the same model
//! with jittered exponential backoff while its budget lasts, capacity
//! failures move on to the next model at once, and fatal failures are
//! returned unchanged. When every model has been abandoned the call fails
//! with [`RociError::Exhausted`], which keeps each model's final error.
//!
//! Models are never called concurrently for the same request.

pub mod classify;
pub mod events;
pub mod options;

pub use classify::{classify_error, Classification, DefaultClassifier, ErrorClassifier};
pub use events::{
    ErrorCallback, ErrorEvent, FallbackCallback, FallbackEvent, RetryCallback, RetryEvent,
};
pub use options::FallbackOptions;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::StreamExt;

use crate::error::{FailedAttempt, FallbackExhausted, RociError};
use crate::models::{ModelCapabilities, SupportedUrls};
use crate::provider::{ModelProvider, ProviderRequest, ProviderResponse, TextStream};
use crate::util::backoff::{backoff_delay, JitterSource, ThreadRngJitter};
use crate::util::cancel::{run_with_cancel, sleep_with_cancel};

const DEFAULT_PROVIDER_NAME: &str = "fallback";
const MODEL_ID_SEPARATOR: &str = " -> ";

/// A provider operation the chain can drive.
trait Operation: Send + Sync {
    type Output: Send;
    const NAME: &'static str;

    fn invoke<'a>(
        &self,
        model: &'a dyn ModelProvider,
        request: &'a ProviderRequest,
    ) -> BoxFuture<'a, Result<Self::Output, RociError>>;
}

struct GenerateOp;

impl Operation for GenerateOp {
    type Output = ProviderResponse;
    const NAME: &'static str = "generate";

    fn invoke<'a>(
        &self,
        model: &'a dyn ModelProvider,
        request: &'a ProviderRequest,
    ) -> BoxFuture<'a, Result<ProviderResponse, RociError>> {
        model.generate_text(request)
    }
}

struct StreamOp;

impl Operation for StreamOp {
    type Output = TextStream;
    const NAME: &'static str = "stream";

    fn invoke<'a>(
        &self,
        model: &'a dyn ModelProvider,
        request: &'a ProviderRequest,
    ) -> BoxFuture<'a, Result<TextStream, RociError>> {
        model.stream_text(request)
    }
}

/// An ordered, non-empty chain of models presented as a single model.
pub struct FallbackModel {
    models: Vec<Arc<dyn ModelProvider>>,
    options: FallbackOptions,
    classifier: Arc<dyn ErrorClassifier>,
    jitter: Arc<dyn JitterSource>,
    provider_name: String,
    model_id: String,
    capabilities: ModelCapabilities,
}

impl FallbackModel {
    /// Build a chain from `models`, primary first.
    ///
    /// Fails with [`RociError::Configuration`] when `models` is empty.
    pub fn new(
        models: Vec<Arc<dyn ModelProvider>>,
        options: FallbackOptions,
    ) -> Result<Self, RociError> {
        let Some((primary, rest)) = models.split_first() else {
            return Err(RociError::Configuration(
                "fallback chain requires at least one model".into(),
            ));
        };

        let capabilities = rest.iter().fold(primary.capabilities().clone(), |acc, model| {
            acc.intersect(model.capabilities())
        });
        let provider_name = options
            .provider_name
            .clone()
            .unwrap_or_else(|| DEFAULT_PROVIDER_NAME.to_string());
        let model_id = options.model_id.clone().unwrap_or_else(|| {
            models
                .iter()
                .map(|m| m.model_id())
                .collect::<Vec<_>>()
                .join(MODEL_ID_SEPARATOR)
        });
        let classifier = options
            .classifier
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultClassifier));
        let jitter = options
            .jitter
            .clone()
            .unwrap_or_else(|| Arc::new(ThreadRngJitter));

        Ok(Self {
            models,
            options,
            classifier,
            jitter,
            provider_name,
            model_id,
            capabilities,
        })
    }

    /// Models in the chain, primary first.
    pub fn models(&self) -> &[Arc<dyn ModelProvider>] {
        &self.models
    }

    pub fn options(&self) -> &FallbackOptions {
        &self.options
    }

    /// Walk the chain until one model succeeds.
    ///
    /// Returns the index of the model that produced the output.
    async fn execute<O: Operation>(
        &self,
        op: O,
        request: &ProviderRequest,
    ) -> Result<(usize, O::Output), RociError> {
        let cancel = request.cancel.as_ref();
        let max_retries = self.options.max_retries_per_model;
        let mut failures = Vec::new();

        for (model_index, model) in self.models.iter().enumerate() {
            let model = model.as_ref();
            let mut attempt: u32 = 0;

            loop {
                if request.is_cancelled() {
                    return Err(RociError::Cancelled);
                }

                tracing::debug!(
                    operation = O::NAME,
                    model_index,
                    provider = model.provider_name(),
                    model = model.model_id(),
                    attempt = attempt + 1,
                    "Calling model"
                );

                let error = match run_with_cancel(cancel, op.invoke(model, request)).await {
                    Ok(output) => {
                        if model_index > 0 {
                            tracing::info!(
                                operation = O::NAME,
                                model_index,
                                provider = model.provider_name(),
                                model = model.model_id(),
                                "Fallback model succeeded"
                            );
                        }
                        return Ok((model_index, output));
                    }
                    Err(error) => error,
                };

                if error.is_cancelled() {
                    return Err(error);
                }
                if request.is_cancelled() {
                    return Err(RociError::Cancelled);
                }

                let classification = self.classifier.classify(&error);
                if let Some(on_error) = &self.options.on_error {
                    on_error(&ErrorEvent {
                        model_index,
                        model,
                        error: &error,
                        classification,
                    });
                }

                match classification {
                    Classification::Throw => {
                        tracing::debug!(
                            operation = O::NAME,
                            model_index,
                            provider = model.provider_name(),
                            model = model.model_id(),
                            category = ?error.category(),
                            error = %error,
                            "Model failed with non-recoverable error"
                        );
                        return Err(error);
                    }
                    Classification::Retry if attempt < max_retries => {
                        let delay = backoff_delay(
                            attempt,
                            self.options.base_delay,
                            self.options.max_delay,
                            self.jitter.as_ref(),
                        );
                        tracing::warn!(
                            operation = O::NAME,
                            model_index,
                            provider = model.provider_name(),
                            model = model.model_id(),
                            attempt = attempt + 1,
                            max_retries,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "Retrying model after error"
                        );
                        if let Some(on_retry) = &self.options.on_retry {
                            on_retry(&RetryEvent {
                                model_index,
                                model,
                                attempt: attempt + 1,
                                max_retries,
                                error: &error,
                                delay,
                            });
                        }
                        sleep_with_cancel(delay, cancel).await?;
                        attempt += 1;
                        continue;
                    }
                    Classification::Retry | Classification::Fallback => {}
                }

                let attempts = attempt + 1;
                if let Some(next_model) = self.models.get(model_index + 1) {
                    let next_model = next_model.as_ref();
                    tracing::warn!(
                        operation = O::NAME,
                        failed_model_index = model_index,
                        failed_model = model.model_id(),
                        next_model_index = model_index + 1,
                        next_model = next_model.model_id(),
                        attempts,
                        classification = %classification,
                        error = %error,
                        "Falling back to next model"
                    );
                    if let Some(on_fallback) = &self.options.on_fallback {
                        on_fallback(&FallbackEvent {
                            failed_model_index: model_index,
                            failed_model: model,
                            next_model_index: model_index + 1,
                            next_model,
                            error: &error,
                            attempts,
                        });
                    }
                }

                failures.push(FailedAttempt {
                    model_index,
                    provider: model.provider_name().to_string(),
                    model_id: model.model_id().to_string(),
                    attempts,
                    error,
                });
                break;
            }
        }

        let exhausted = FallbackExhausted::new(failures);
        tracing::error!(
            operation = O::NAME,
            models = exhausted.len(),
            error = %exhausted,
            "All models in fallback chain failed"
        );
        Err(exhausted.into())
    }
}

impl fmt::Debug for FallbackModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackModel")
            .field("provider_name", &self.provider_name)
            .field("model_id", &self.model_id)
            .field("models", &self.models.len())
            .field("options", &self.options)
            .finish()
    }
}

#[async_trait]
impl ModelProvider for FallbackModel {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }

    fn supported_urls(&self) -> SupportedUrls {
        let declared: Vec<SupportedUrls> =
            self.models.iter().map(|m| m.supported_urls()).collect();
        SupportedUrls::union(&declared)
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, RociError> {
        let (_, response) = self.execute(GenerateOp, request).await?;
        Ok(response)
    }

    /// Fallback covers failures to open the stream. Once a stream is returned
    /// its errors are passed through as-is, since output may already have
    /// been consumed.
    async fn stream_text(&self, request: &ProviderRequest) -> Result<TextStream, RociError> {
        let (model_index, stream) = self.execute(StreamOp, request).await?;
        let model = &self.models[model_index];
        let provider = model.provider_name().to_string();
        let model_id = model.model_id().to_string();

        Ok(stream
            .inspect(move |item| {
                if let Err(error) = item {
                    tracing::warn!(
                        provider = %provider,
                        model = %model_id,
                        error = %error,
                        "Stream failed after it started; not falling back"
                    );
                }
            })
            .boxed())
    }
}
