//! Error types for the Docent service.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, LLM, retrieval, tool execution,
//! and agent-loop errors.

use thiserror::Error;

/// Unified error type for the Docent service.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// Per-query failures (tool errors, malformed model output, loop bound
/// exhaustion) are contained inside the agent's result and do not surface
/// through this type; only configuration and unexpected provider-level
/// failures do.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors. Fatal at startup: the service refuses
    /// to construct an agent without a valid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language-model provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding and similarity-search errors.
    ///
    /// `retryable` distinguishes transient provider failures (timeouts,
    /// connection resets) from permanent ones (malformed input, dimension
    /// mismatch). Retry policy is left to the caller.
    #[error("Retrieval error: {message}")]
    Retrieval { message: String, retryable: bool },

    /// Tool invocation errors
    #[error("Tool error: {0}")]
    Tool(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build a non-retryable retrieval error (malformed input, bad state).
    pub fn retrieval(message: impl Into<String>) -> Self {
        AppError::Retrieval {
            message: message.into(),
            retryable: false,
        }
    }

    /// Build a retryable retrieval error (transient provider failure).
    pub fn retrieval_transient(message: impl Into<String>) -> Self {
        AppError::Retrieval {
            message: message.into(),
            retryable: true,
        }
    }

    /// Whether retrying the failed operation could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Retrieval { retryable: true, .. })
    }
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
