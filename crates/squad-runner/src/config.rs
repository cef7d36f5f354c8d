//! Configuration types for the squad runner.
//!
//! Runner settings come from environment variables. Mission rules live in
//! the YAML file named by `SQUAD_CONFIG`; without it the built-in defaults
//! apply. Without `LLM_BACKEND` the runner plays offline.

use std::path::PathBuf;

use crate::error::RunnerError;

/// Complete runner configuration loaded from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Reasoning backend, or `None` to play with the offline collaborator.
    pub backend: Option<LlmBackendConfig>,
    /// Path to `squad-config.yaml`.
    pub config_path: Option<PathBuf>,
    /// Stop after this many rounds even if the mission is still running.
    pub max_rounds: Option<u32>,
    /// Where to write the event log as JSON when the run ends.
    pub event_log_path: Option<PathBuf>,
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmBackendConfig {
    /// The backend type.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible API (works with `OpenAI`, `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

impl BackendType {
    fn parse(name: &str) -> Result<Self, RunnerError> {
        match name.to_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(RunnerError::Config(format!("unknown backend type: {other}"))),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `LLM_BACKEND` -- backend type; when set, `LLM_API_URL`,
    ///   `LLM_API_KEY` and `LLM_MODEL` become required
    /// - `SQUAD_CONFIG` -- path to the mission rules YAML
    /// - `SQUAD_ROUNDS` -- stop after this many rounds
    /// - `SQUAD_EVENT_LOG` -- write the event log here on exit
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            non_empty(name).ok_or_else(|| RunnerError::Config(format!("missing required env var {name}")))
        };

        let backend = match non_empty("LLM_BACKEND") {
            Some(kind) => Some(LlmBackendConfig {
                backend_type: BackendType::parse(&kind)?,
                api_url: required("LLM_API_URL")?,
                api_key: required("LLM_API_KEY")?,
                model: required("LLM_MODEL")?,
            }),
            None => None,
        };

        let max_rounds = non_empty("SQUAD_ROUNDS")
            .map(|v| {
                v.trim()
                    .parse::<u32>()
                    .map_err(|e| RunnerError::Config(format!("invalid SQUAD_ROUNDS: {e}")))
            })
            .transpose()?;

        Ok(Self {
            backend,
            config_path: non_empty("SQUAD_CONFIG").map(PathBuf::from),
            max_rounds,
            event_log_path: non_empty("SQUAD_EVENT_LOG").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<RunnerConfig, RunnerError> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        RunnerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_plays_offline() {
        let config = load(&[]).unwrap();
        assert_eq!(config.backend, None);
        assert_eq!(config.config_path, None);
        assert_eq!(config.max_rounds, None);
    }

    #[test]
    fn backend_needs_its_credentials() {
        let err = load(&[("LLM_BACKEND", "openai"), ("LLM_API_URL", "http://localhost:11434/v1")]);
        assert!(matches!(err, Err(RunnerError::Config(msg)) if msg.contains("LLM_API_KEY")));
    }

    #[test]
    fn backend_type_parsing() {
        let config = load(&[
            ("LLM_BACKEND", "Claude"),
            ("LLM_API_URL", "https://api.anthropic.com/v1"),
            ("LLM_API_KEY", "test-key"),
            ("LLM_MODEL", "test-model"),
            ("SQUAD_ROUNDS", "5"),
        ])
        .unwrap();
        assert_eq!(config.backend.map(|b| b.backend_type), Some(BackendType::Anthropic));
        assert_eq!(config.max_rounds, Some(5));
        assert!(BackendType::parse("carrier-pigeon").is_err());
    }

    #[test]
    fn bad_round_limit_is_rejected() {
        assert!(load(&[("SQUAD_ROUNDS", "many")]).is_err());
    }
}
