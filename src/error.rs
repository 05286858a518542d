//! Error types for the Mochi backend.

use std::time::Duration;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Why a model reply could not be turned into a dialogue turn.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFailure {
    #[error("malformed JSON: {0}")]
    Syntax(String),

    #[error("expected a single JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must be a string")]
    NotAString(&'static str),

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("unsupported expression `{0}`")]
    UnsupportedExpression(String),
}

/// A model reply that failed to decode. Always keeps the untouched reply text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{failure}")]
pub struct DecodeError {
    pub failure: DecodeFailure,
    pub raw: String,
}

impl DecodeError {
    pub fn new(failure: DecodeFailure, raw: impl Into<String>) -> Self {
        Self {
            failure,
            raw: raw.into(),
        }
    }
}

/// Errors surfaced by the dialogue flows.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Model returned invalid JSON: {0}")]
    InvalidModelOutput(#[from] DecodeError),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_every_field() {
        let err = DialogueError::MissingFields(vec!["userPrompt", "nickname"]);
        assert_eq!(
            err.to_string(),
            "Missing required fields: userPrompt, nickname"
        );
    }

    #[test]
    fn decode_error_displays_failure_not_raw() {
        let err = DecodeError::new(DecodeFailure::MissingField("feedback"), "{\"x\":1}");
        assert_eq!(err.to_string(), "missing field `feedback`");
        assert_eq!(err.raw, "{\"x\":1}");
    }
}
