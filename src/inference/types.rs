//! Shared types for the inference client.
//!
//! These mirror the Ollama chat API types (`POST /api/chat`,
//! `GET /api/tags`), used for both request building and response parsing.

use serde::{Deserialize, Serialize};

// ─── Request Types ───────────────────────────────────────────────────────────

/// A single message in the conversation.
///
/// Serialization notes for the Ollama chat endpoint:
/// - `content` is always sent, `""` rather than `null` for assistant
///   messages that only carry tool calls.
/// - `tool_calls` appears on assistant messages that requested tools.
/// - `tool_name` appears on `tool` role messages so the model can match a
///   result back to the call that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl ChatMessage {
    /// A `system` role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    /// A `user` role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    /// An `assistant` role message with text content only.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// A `tool` role message carrying one tool's result back to the model.
    pub fn tool(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: None,
            tool_name: Some(tool_name.into()),
        }
    }

    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_name: None,
        }
    }
}

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Tool definition sent in the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub r#type: String,
    pub function: FunctionDefinition,
}

/// Function definition within a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    pub stream: bool,
}

// ─── Response Types ──────────────────────────────────────────────────────────

/// A tool call as it appears on the wire inside an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallPayload {
    pub function: FunctionCall,
}

/// Function call details within a tool call payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Ollama delivers arguments as a JSON object, not a string.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// A tool call flattened for dispatch.
///
/// Ollama does not assign call IDs; one is synthesized so logs and event
/// pairing can refer to a specific invocation.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Response body for a non-streaming `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub message: ChatMessage,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
}

impl ChatResponse {
    /// Flatten the assistant message's tool call payloads into dispatchable
    /// [`ToolCall`]s, synthesizing an ID per call.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.message
            .tool_calls
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|payload| ToolCall {
                id: format!("call_{}", uuid::Uuid::new_v4()),
                name: payload.function.name.clone(),
                arguments: payload.function.arguments.clone(),
            })
            .collect()
    }
}

// ─── Model Listing (`GET /api/tags`) ─────────────────────────────────────────

/// Raw `/api/tags` response shape.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Option<Vec<ModelDescriptor>>,
}

/// One installed model as reported by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub details: Option<ModelDetails>,
}

/// Details sub-object from the tags API.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub parameter_size: Option<String>,
    #[serde(default)]
    pub quantization_level: Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_calls_omitted_when_none() {
        let msg = ChatMessage::user("hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("tool_calls"), "tool_calls should be omitted");
        assert!(!json.contains("tool_name"), "tool_name should be omitted");
    }

    #[test]
    fn tool_message_carries_name() {
        let msg = ChatMessage::tool("read_file", "{\"content\":\"...\"}");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"tool\""));
        assert!(json.contains("\"tool_name\":\"read_file\""));
    }

    #[test]
    fn chat_response_flattens_tool_calls() {
        let body = r#"{
            "model": "qwen3:8b",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "read_file", "arguments": {"file_path": "/tmp/a.txt"}}}
                ]
            },
            "done": true
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let calls = response.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "read_file");
        assert_eq!(calls[0].arguments["file_path"], "/tmp/a.txt");
        assert!(calls[0].id.starts_with("call_"));
    }

    #[test]
    fn chat_response_without_tool_calls() {
        let body = r#"{"message": {"role": "assistant", "content": "done"}, "done": true}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(response.tool_calls().is_empty());
        assert_eq!(response.message.content, "done");
    }

    #[test]
    fn tags_response_tolerates_missing_fields() {
        let body = r#"{"models": [{"name": "qwen3:8b"}]}"#;
        let tags: TagsResponse = serde_json::from_str(body).unwrap();
        let models = tags.models.unwrap();
        assert_eq!(models[0].name, "qwen3:8b");
        assert_eq!(models[0].size, 0);
        assert!(models[0].details.is_none());
    }

    #[test]
    fn tools_omitted_from_request_when_none() {
        let req = ChatRequest {
            model: "qwen3:8b".to_string(),
            messages: vec![ChatMessage::user("hi")],
            tools: None,
            stream: false,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("\"tools\""), "tools should be omitted when None");
        assert!(json.contains("\"stream\":false"));
    }
}
