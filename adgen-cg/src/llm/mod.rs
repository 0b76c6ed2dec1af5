//! Language-model client abstraction
//!
//! The concept generator only needs "system role + instruction in, raw text
//! out". Every failure mode (network, timeout, non-2xx, empty completion,
//! undecodable body) is reported as an [`LlmError`] and handled identically by
//! the caller.

pub mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use thiserror::Error;

/// One model invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// LLM client errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Model returned an empty completion")]
    EmptyCompletion,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Client capable of a single chat completion
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Model identifier, for logging
    fn model(&self) -> &str;

    /// Return the raw completion text or fail
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
