//! Convenience re-exports for common use.

pub use crate::config::FallbackConfig;
pub use crate::error::{FallbackExhausted, Result, RociError};
pub use crate::fallback::{
    Classification, ErrorClassifier, FallbackEvent, FallbackModel, FallbackOptions, RetryEvent,
};
pub use crate::models::{ModelCapabilities, SupportedUrls};
pub use crate::provider::{ModelProvider, ProviderRequest, ProviderResponse, TextStream};
pub use crate::types::{
    ContentPart, FinishReason, GenerationSettings, ModelMessage, Role, StreamEventType,
    TextStreamDelta, Usage,
};
pub use tokio_util::sync::CancellationToken;
