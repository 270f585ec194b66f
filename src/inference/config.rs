//! Backend configuration.
//!
//! Resolves the Ollama endpoint and active model from environment
//! variables. Config is the single source of truth for where inference
//! requests go; everything else (capability sets, prompts) is fixed per
//! pipeline role.

use serde::{Deserialize, Serialize};

/// Environment variable overriding the backend base URL.
const ENV_BASE_URL: &str = "OLLAMA_BASE_URL";

/// Environment variable overriding the active model.
const ENV_MODEL: &str = "OLLAMA_MODEL";

/// Default Ollama endpoint.
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model: small enough to run on consumer hardware, good enough
/// at tool calling for document work.
const DEFAULT_MODEL: &str = "qwen3:8b";

/// Inference backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the Ollama HTTP API (no trailing slash).
    pub backend_url: String,
    /// Name of the active model (e.g. `qwen3:8b`).
    pub model: String,
}

impl BackendConfig {
    /// Build a config from explicit values, trimming any trailing slash so
    /// endpoint paths can be appended uniformly.
    pub fn new(backend_url: impl Into<String>, model: impl Into<String>) -> Self {
        let mut backend_url = backend_url.into();
        while backend_url.ends_with('/') {
            backend_url.pop();
        }
        Self {
            backend_url,
            model: model.into(),
        }
    }

    /// Resolve the config from `OLLAMA_BASE_URL` / `OLLAMA_MODEL`, falling
    /// back to the local defaults.
    pub fn from_env() -> Self {
        let backend_url =
            std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var(ENV_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(backend_url, model)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_MODEL)
    }
}
