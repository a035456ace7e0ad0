//! Error types for Safety Copilot.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, document processing, LLM
//! providers, synthesis, and serialization.

use thiserror::Error;

/// Unified error type for Safety Copilot.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document extraction and chunking errors
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Retrieval collaborator errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Synthesis pipeline errors
    #[error("Synthesis error: {0}")]
    Synthesis(String),

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
