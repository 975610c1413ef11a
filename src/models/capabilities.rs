//! Model capabilities descriptor.

use serde::{Deserialize, Serialize};

/// Describes what a model can do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelCapabilities {
    pub supports_vision: bool,
    pub supports_tools: bool,
    pub supports_streaming: bool,
    pub supports_json_mode: bool,
    pub supports_json_schema: bool,
    pub supports_reasoning: bool,
    pub supports_system_messages: bool,
    pub context_length: usize,
    pub max_output_tokens: Option<usize>,
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            supports_vision: false,
            supports_tools: false,
            supports_streaming: true,
            supports_json_mode: false,
            supports_json_schema: false,
            supports_reasoning: false,
            supports_system_messages: true,
            context_length: 4096,
            max_output_tokens: None,
        }
    }
}

impl ModelCapabilities {
    /// Full-featured model capabilities.
    pub fn full(context_length: usize) -> Self {
        Self {
            supports_vision: true,
            supports_tools: true,
            supports_streaming: true,
            supports_json_mode: true,
            supports_json_schema: true,
            supports_reasoning: false,
            supports_system_messages: true,
            context_length,
            max_output_tokens: None,
        }
    }

    /// Capabilities guaranteed by both `self` and `other`.
    ///
    /// A request that fits the result fits either model, so a fallback chain
    /// advertises the intersection of its members.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            supports_vision: self.supports_vision && other.supports_vision,
            supports_tools: self.supports_tools && other.supports_tools,
            supports_streaming: self.supports_streaming && other.supports_streaming,
            supports_json_mode: self.supports_json_mode && other.supports_json_mode,
            supports_json_schema: self.supports_json_schema && other.supports_json_schema,
            supports_reasoning: self.supports_reasoning && other.supports_reasoning,
            supports_system_messages: self.supports_system_messages
                && other.supports_system_messages,
            context_length: self.context_length.min(other.context_length),
            max_output_tokens: match (self.max_output_tokens, other.max_output_tokens) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        }
    }
}
