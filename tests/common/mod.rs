//! Shared test helpers: scripted providers and an event recorder.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use roci_fallback::error::RociError;
use roci_fallback::fallback::{
    Classification, ErrorEvent, FallbackEvent, FallbackOptions, RetryEvent,
};
use roci_fallback::models::{ModelCapabilities, SupportedUrls};
use roci_fallback::provider::{ModelProvider, ProviderRequest, ProviderResponse, TextStream};
use roci_fallback::types::{FinishReason, TextStreamDelta, Usage};

/// What a scripted `stream_text` call does.
pub enum StreamScript {
    /// Fail before the stream starts.
    Fail(RociError),
    /// Return a stream yielding these items.
    Items(Vec<Result<TextStreamDelta, RociError>>),
}

/// A provider that replays queued results, then answers with a default.
pub struct ScriptedProvider {
    provider: String,
    model_id: String,
    capabilities: ModelCapabilities,
    supported_urls: SupportedUrls,
    latency: Option<Duration>,
    generate_script: Mutex<VecDeque<Result<String, RociError>>>,
    stream_script: Mutex<VecDeque<StreamScript>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(provider: &str, model_id: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model_id: model_id.to_string(),
            capabilities: ModelCapabilities::full(128_000),
            supported_urls: SupportedUrls::default(),
            latency: None,
            generate_script: Mutex::new(VecDeque::new()),
            stream_script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_with(self, error: RociError) -> Self {
        self.generate_script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn succeeding_with(self, text: &str) -> Self {
        self.generate_script
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
        self
    }

    pub fn streaming(self, script: StreamScript) -> Self {
        self.stream_script.lock().unwrap().push_back(script);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_supported_urls(mut self, urls: SupportedUrls) -> Self {
        self.supported_urls = urls;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of generate/stream calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn default_response(&self) -> String {
        format!("{} response", self.model_id)
    }

    async fn begin_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }

    fn supported_urls(&self) -> SupportedUrls {
        self.supported_urls.clone()
    }

    async fn generate_text(
        &self,
        _request: &ProviderRequest,
    ) -> Result<ProviderResponse, RociError> {
        self.begin_call().await;
        let next = self.generate_script.lock().unwrap().pop_front();
        let text = match next {
            Some(result) => result?,
            None => self.default_response(),
        };
        Ok(ProviderResponse {
            text,
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
                ..Default::default()
            },
            finish_reason: Some(FinishReason::Stop),
        })
    }

    async fn stream_text(&self, _request: &ProviderRequest) -> Result<TextStream, RociError> {
        self.begin_call().await;
        let next = self.stream_script.lock().unwrap().pop_front();
        let items = match next {
            Some(StreamScript::Fail(error)) => return Err(error),
            Some(StreamScript::Items(items)) => items,
            None => vec![
                Ok(TextStreamDelta::text(self.default_response())),
                Ok(TextStreamDelta::done(FinishReason::Stop, None)),
            ],
        };
        let stream = async_stream::stream! {
            for item in items {
                yield item;
            }
        };
        Ok(stream.boxed())
    }
}

/// Erase scripted providers into a chain.
pub fn chain(models: &[&Arc<ScriptedProvider>]) -> Vec<Arc<dyn ModelProvider>> {
    models
        .iter()
        .map(|m| Arc::clone(*m) as Arc<dyn ModelProvider>)
        .collect()
}

/// Owned snapshot of an emitted event.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Error {
        model_index: usize,
        model_id: String,
        classification: Classification,
        message: String,
    },
    Retry {
        model_index: usize,
        attempt: u32,
        max_retries: u32,
        delay: Duration,
    },
    Fallback {
        failed_model_index: usize,
        next_model_index: usize,
        next_model_id: String,
        attempts: u32,
    },
}

/// Collects events from the callbacks installed by [`EventLog::options`].
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Recorded>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn retries(&self) -> Vec<Recorded> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Recorded::Retry { .. }))
            .collect()
    }

    pub fn fallbacks(&self) -> Vec<Recorded> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Recorded::Fallback { .. }))
            .collect()
    }

    /// Options with every callback recording into this log and a fixed
    /// jitter sample of 0, so each delay is exactly half the exponential delay.
    pub fn options(&self, max_retries_per_model: u32) -> FallbackOptions {
        let on_error = self.0.clone();
        let on_retry = self.0.clone();
        let on_fallback = self.0.clone();

        FallbackOptions::builder()
            .max_retries_per_model(max_retries_per_model)
            .jitter(Arc::new(|| 0.0_f64))
            .on_error(Arc::new(move |event: &ErrorEvent<'_>| {
                on_error.lock().unwrap().push(Recorded::Error {
                    model_index: event.model_index,
                    model_id: event.model.model_id().to_string(),
                    classification: event.classification,
                    message: event.error.to_string(),
                });
            }))
            .on_retry(Arc::new(move |event: &RetryEvent<'_>| {
                on_retry.lock().unwrap().push(Recorded::Retry {
                    model_index: event.model_index,
                    attempt: event.attempt,
                    max_retries: event.max_retries,
                    delay: event.delay,
                });
            }))
            .on_fallback(Arc::new(move |event: &FallbackEvent<'_>| {
                on_fallback.lock().unwrap().push(Recorded::Fallback {
                    failed_model_index: event.failed_model_index,
                    next_model_index: event.next_model_index,
                    next_model_id: event.next_model.model_id().to_string(),
                    attempts: event.attempts,
                });
            }))
            .build()
    }
}
