//! Ollama inference client.
//!
//! Sends non-streaming chat requests to a local Ollama endpoint and lists
//! the installed models. The orchestration layer never talks HTTP itself;
//! everything goes through this client.

use std::time::Duration;

use reqwest::Client as HttpClient;

use super::errors::InferenceError;
use super::types::{
    ChatMessage, ChatRequest, ChatResponse, ModelDescriptor, TagsResponse, ToolDefinition,
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request timeout for chat calls.
///
/// Local models need time to process a large context before producing a
/// full non-streaming answer; a short timeout here surfaces as a spurious
/// "backend unreachable" mid-turn.
const CHAT_TIMEOUT: Duration = Duration::from_secs(300);

/// Total request timeout for the model-listing health probe.
const TAGS_TIMEOUT: Duration = Duration::from_secs(5);

// ─── OllamaClient ────────────────────────────────────────────────────────────

/// Client for the Ollama HTTP API.
///
/// Cheap to clone: each sub-agent holds its own copy bound to the same
/// connection pool.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for the given base URL (no trailing slash).
    ///
    /// Does NOT check connectivity; that happens on the first request.
    pub fn new(base_url: impl Into<String>) -> Result<Self, InferenceError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(CHAT_TIMEOUT)
            .build()
            .map_err(|e| InferenceError::ClientBuild {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// The base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─── Chat ────────────────────────────────────────────────────────────

    /// Send a non-streaming chat request and return the parsed response.
    pub async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<ChatResponse, InferenceError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: model.to_string(),
            messages,
            tools,
            stream: false,
        };

        tracing::debug!(
            url = %url,
            model = %body.model,
            message_count = body.messages.len(),
            tool_count = body.tools.as_ref().map(|t| t.len()).unwrap_or(0),
            "sending chat request"
        );

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_transport_error(&url, e, CHAT_TIMEOUT))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::HttpStatus {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let body_text = response
            .text()
            .await
            .map_err(|e| InferenceError::InvalidResponse {
                endpoint: url.clone(),
                reason: format!("failed to read response body: {e}"),
            })?;

        serde_json::from_str::<ChatResponse>(&body_text).map_err(|e| {
            InferenceError::InvalidResponse {
                endpoint: url,
                reason: format!("failed to parse chat response: {e}"),
            }
        })
    }

    // ─── Model Listing ───────────────────────────────────────────────────

    /// List the models installed on the backend via `GET /api/tags`.
    ///
    /// Doubles as the health probe: a successful response means the
    /// backend is reachable.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>, InferenceError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .http
            .get(&url)
            .timeout(TAGS_TIMEOUT)
            .send()
            .await
            .map_err(|e| Self::map_transport_error(&url, e, TAGS_TIMEOUT))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::HttpStatus {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let tags: TagsResponse =
            response
                .json()
                .await
                .map_err(|e| InferenceError::InvalidResponse {
                    endpoint: url,
                    reason: format!("failed to parse tags response: {e}"),
                })?;

        Ok(tags.models.unwrap_or_default())
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    /// Map a reqwest transport error to the inference taxonomy.
    fn map_transport_error(url: &str, e: reqwest::Error, timeout: Duration) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout {
                duration_secs: timeout.as_secs(),
            }
        } else {
            InferenceError::ConnectionFailed {
                endpoint: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
