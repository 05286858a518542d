//! Provider-agnostic completion types and the `LlmProvider` trait.

use async_trait::async_trait;

use crate::error::LlmError;

/// A one-shot completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Full prompt text, sent as a single user turn.
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Text returned by the model plus token accounting.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A text-completion backend.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier this provider was configured with.
    fn model_name(&self) -> &str;

    /// Send a request and return the raw model text.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
