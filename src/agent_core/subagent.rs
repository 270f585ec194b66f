//! Sub-agent: one model binding restricted to a fixed capability set.
//!
//! `invoke` drives the tool round loop: the model answers, any tool calls
//! it made are executed (through the interceptor) and fed back as tool
//! messages, and the model is called again until it stops requesting
//! tools. No conversation state is retained between invocations.

use serde_json::json;

use crate::inference::{ChatMessage, InferenceError, OllamaClient, ToolCall};
use crate::tools::fs_tools::truncate_utf8;

use super::capabilities::{CapabilityRole, CapabilitySet};
use super::events::{EventSink, Intercepted};

// ─── Constants ──────────────────────────────────────────────────────────────

/// Maximum model round-trips per invocation.
///
/// Each round is one model response plus one batch of tool executions.
/// Reading many attachments can take several rounds; a model stuck in a
/// call loop is cut off here.
const MAX_TOOL_ROUNDS: usize = 10;

/// Maximum characters of a tool result fed back to the model.
///
/// One oversized result (a long extraction, a big directory listing)
/// must not starve the rest of the turn's context window.
const MAX_TOOL_RESULT_CHARS: usize = 6_000;

// ─── SubAgent ───────────────────────────────────────────────────────────────

/// One inference binding plus the tools its role authorizes.
#[derive(Debug, Clone)]
pub struct SubAgent {
    client: OllamaClient,
    model: String,
    capabilities: CapabilitySet,
    events: EventSink,
}

impl SubAgent {
    pub fn new(
        client: OllamaClient,
        model: impl Into<String>,
        capabilities: CapabilitySet,
        events: EventSink,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            capabilities,
            events,
        }
    }

    /// The role this agent is bound to.
    pub fn role(&self) -> CapabilityRole {
        self.capabilities.role()
    }

    /// Run the model over `history`, executing any tool calls it makes,
    /// and return the history extended with the model's replies and the
    /// tool call/result message pairs.
    ///
    /// The agent is stateless: every bit of context must be in `history`.
    pub async fn invoke(
        &self,
        history: Vec<ChatMessage>,
    ) -> Result<Vec<ChatMessage>, InferenceError> {
        let mut history = history;
        let tools = self.capabilities.definitions();

        for round in 0..MAX_TOOL_ROUNDS {
            let response = self
                .client
                .chat(&self.model, history.clone(), tools.clone())
                .await?;

            let calls = response.tool_calls();
            history.push(response.message);

            if calls.is_empty() {
                tracing::debug!(
                    role = ?self.role(),
                    round,
                    "model answered without tool calls"
                );
                return Ok(history);
            }

            for call in &calls {
                let result_text = self.dispatch(call);
                history.push(ChatMessage::tool(call.name.clone(), result_text));
            }
        }

        tracing::warn!(
            role = ?self.role(),
            limit = MAX_TOOL_ROUNDS,
            "tool round limit reached, returning history as-is"
        );
        Ok(history)
    }

    /// Execute one tool call and render its result for the model.
    ///
    /// A call outside the capability set is answered with error data and
    /// produces NO interceptor events: unauthorized tools do not exist
    /// as far as the event stream is concerned.
    fn dispatch(&self, call: &ToolCall) -> String {
        let Some(spec) = self.capabilities.get(&call.name) else {
            tracing::warn!(
                role = ?self.role(),
                tool = %call.name,
                "model requested a tool outside its capability set"
            );
            let available = self.capabilities.names().join(", ");
            return json!({
                "error": format!(
                    "unknown tool '{}'; available tools: {}",
                    call.name,
                    if available.is_empty() { "none" } else { available.as_str() }
                )
            })
            .to_string();
        };

        tracing::info!(
            role = ?self.role(),
            tool = %call.name,
            call_id = %call.id,
            "dispatching tool call"
        );

        let value = Intercepted::new(spec, &self.events).invoke(&call.arguments);
        clip_result(&value.to_string())
    }
}

/// Cap a tool result so one invocation cannot flood the context window.
fn clip_result(text: &str) -> String {
    if text.len() <= MAX_TOOL_RESULT_CHARS {
        return text.to_string();
    }
    format!(
        "{}\n\n[... truncated: showing first {MAX_TOOL_RESULT_CHARS} of {} chars]",
        truncate_utf8(text, MAX_TOOL_RESULT_CHARS),
        text.len()
    )
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_core::events::EventKind;
    use crate::tools::{builtin_catalogue, DocumentStore, PlainTextParser};
    use std::sync::Arc;

    fn agent_with_role(role: CapabilityRole) -> (SubAgent, tokio::sync::mpsc::UnboundedReceiver<crate::agent_core::events::AgentEvent>) {
        let (document, _doc_rx) = DocumentStore::new();
        let catalogue = builtin_catalogue(Arc::new(PlainTextParser), document);
        let (events, rx) = EventSink::channel();
        let client = OllamaClient::new("http://127.0.0.1:1").unwrap();
        let agent = SubAgent::new(
            client,
            "qwen3:8b",
            CapabilitySet::bind(role, &catalogue),
            events,
        );
        (agent, rx)
    }

    #[test]
    fn unauthorized_tool_yields_error_data_and_no_events() {
        let (agent, mut rx) = agent_with_role(CapabilityRole::Writer);
        let call = ToolCall {
            id: "call_test".into(),
            name: "read_file".into(),
            arguments: json!({"file_path": "/tmp/a.txt"}),
        };

        let text = agent.dispatch(&call);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["error"]
            .as_str()
            .unwrap()
            .contains("unknown tool 'read_file'"));
        assert!(rx.try_recv().is_err(), "no events for unauthorized tools");
    }

    #[test]
    fn authorized_tool_emits_event_pair() {
        let (agent, mut rx) = agent_with_role(CapabilityRole::Writer);
        let call = ToolCall {
            id: "call_test".into(),
            name: "update_documentation".into(),
            arguments: json!({"content": "# Doc"}),
        };

        let text = agent.dispatch(&call);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["success"], true);

        assert_eq!(rx.try_recv().unwrap().kind, EventKind::ToolCall);
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::ToolResult);
    }

    #[test]
    fn clip_result_preserves_short_text() {
        assert_eq!(clip_result("short"), "short");
    }

    #[test]
    fn clip_result_annotates_long_text() {
        let long = "y".repeat(7_000);
        let clipped = clip_result(&long);
        assert!(clipped.len() < long.len());
        assert!(clipped.contains("[... truncated: showing first 6000 of 7000 chars]"));
    }

    #[tokio::test]
    async fn invoke_surfaces_backend_failure() {
        let (agent, _rx) = agent_with_role(CapabilityRole::None);
        let err = agent
            .invoke(vec![ChatMessage::user("hello")])
            .await
            .unwrap_err();
        assert!(err.is_unreachable());
    }
}
