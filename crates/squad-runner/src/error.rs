//! Error types for the squad runner.
//!
//! Uses `thiserror` for typed errors that surface from configuration,
//! backend calls and response parsing.

use squad_core::CollaboratorError;

/// Errors that can occur while running a mission.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// The LLM response did not contain a JSON object.
    #[error("response parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<RunnerError> for CollaboratorError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::LlmBackend(msg) | RunnerError::Config(msg) => Self::Unavailable(msg),
            RunnerError::Parse(msg) => Self::Malformed(msg),
            RunnerError::Serde(e) => Self::Malformed(e.to_string()),
        }
    }
}
