//! Error types for the FAQ bot.
//!
//! A single error enum covers configuration, I/O, generation, embedding,
//! index and corpus failures. Upstream failures that the answering pipeline
//! recovers from locally (embedding outages, generation errors) still have
//! their own variants so callers can tell them apart.

use thiserror::Error;

/// Unified error type for the FAQ bot.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// The LLM provider did not answer in time
    #[error("LLM timeout: {0}")]
    LlmTimeout(String),

    /// The LLM provider rejected the request with a rate limit
    #[error("LLM rate limited: {0}")]
    LlmRateLimited(String),

    /// The LLM provider rejected our credentials
    #[error("LLM authentication failed: {0}")]
    LlmAuth(String),

    /// Knowledge base and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Caller misuse: empty index query, non-positive k, malformed corpus entry
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A document id was added twice
    #[error("Duplicate document id: {0}")]
    DuplicateId(String),

    /// The embedding provider is down or timed out
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
