//! Model provider trait and request/response types.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::error::RociError;
use crate::models::{ModelCapabilities, SupportedUrls};
use crate::types::{FinishReason, GenerationSettings, ModelMessage, TextStreamDelta, Usage};

/// Stream of deltas returned by [`ModelProvider::stream_text`].
pub type TextStream = BoxStream<'static, Result<TextStreamDelta, RociError>>;

/// A request sent to a model provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    /// Cancels the request when triggered. Providers should stop work promptly.
    pub cancel: Option<CancellationToken>,
}

impl ProviderRequest {
    pub fn new(messages: Vec<ModelMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Whether the request's cancellation token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// Response from a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by all model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai", "google").
    fn provider_name(&self) -> &str;
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Capabilities of the model.
    fn capabilities(&self) -> &ModelCapabilities;

    /// URLs the model can fetch itself, keyed by media type.
    fn supported_urls(&self) -> SupportedUrls {
        SupportedUrls::default()
    }

    /// Generate text (non-streaming).
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, RociError>;

    /// Generate text (streaming).
    ///
    /// An error returned here means the stream never started; errors inside
    /// the stream arrive after output may already have been consumed.
    async fn stream_text(&self, request: &ProviderRequest) -> Result<TextStream, RociError>;
}
