//! Progress events and the tool invocation interceptor.
//!
//! Each chat turn emits an ordered stream of [`AgentEvent`]s for the UI
//! observer. The interceptor guarantees that every tool invocation
//! produces exactly one `tool_call` and one `tool_result` event, whatever
//! the handler's outcome.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::tools::ToolSpec;

// ─── Events ─────────────────────────────────────────────────────────────────

/// Category of a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Thinking,
    ToolCall,
    ToolResult,
    Completed,
    Error,
}

/// One progress notification. Emitted, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub content: String,
}

// ─── EventSink ──────────────────────────────────────────────────────────────

/// Sending half of the per-controller event stream.
///
/// Emission is fire-and-forget: a dropped observer silently discards
/// events rather than failing the turn.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<AgentEvent>,
}

impl EventSink {
    /// Create a sink plus the receiving end for the observer.
    pub fn channel() -> (Self, UnboundedReceiver<AgentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emit one event.
    pub fn emit(&self, kind: EventKind, content: impl Into<String>) {
        let _ = self.tx.send(AgentEvent {
            kind,
            content: content.into(),
        });
    }

    pub fn thinking(&self, content: impl Into<String>) {
        self.emit(EventKind::Thinking, content);
    }

    pub fn completed(&self) {
        self.emit(EventKind::Completed, "Completed");
    }

    pub fn error(&self, content: impl Into<String>) {
        self.emit(EventKind::Error, content);
    }
}

// ─── Interceptor ────────────────────────────────────────────────────────────

/// Decorator around one tool's handler that brackets the invocation with
/// lifecycle events.
///
/// The wrapped handler's input/output contract is unchanged: a structured
/// error result is rendered as `{"error": "..."}` data for the model, and
/// the `tool_result` event fires unconditionally afterward. "Completed"
/// here means the interception finished, not that the handler succeeded.
pub struct Intercepted<'a> {
    spec: &'a ToolSpec,
    events: &'a EventSink,
}

impl<'a> Intercepted<'a> {
    pub fn new(spec: &'a ToolSpec, events: &'a EventSink) -> Self {
        Self { spec, events }
    }

    /// Invoke the underlying handler, emitting the event pair.
    pub fn invoke(&self, args: &Value) -> Value {
        self.events
            .emit(EventKind::ToolCall, format!("Using tool: {}", self.spec.name));

        let value = match (self.spec.handler)(args) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(tool = self.spec.name, error = %e, "tool reported an error result");
                json!({ "error": e.to_string() })
            }
        };

        self.events.emit(
            EventKind::ToolResult,
            format!("Tool {} completed", self.spec.name),
        );

        value
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalogue::ToolHandler;
    use std::sync::Arc;

    fn tool_with_handler(name: &'static str, handler: ToolHandler) -> ToolSpec {
        ToolSpec {
            name,
            description: "test tool".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
            handler,
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = AgentEvent {
            kind: EventKind::ToolCall,
            content: "Using tool: read_file".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"tool_call","content":"Using tool: read_file"}"#
        );
    }

    #[test]
    fn interceptor_brackets_a_successful_invocation() {
        let (sink, mut rx) = EventSink::channel();
        let spec = tool_with_handler("echo", Arc::new(|args| Ok(args.clone())));

        let value = Intercepted::new(&spec, &sink).invoke(&json!({"x": 1}));
        assert_eq!(value, json!({"x": 1}));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.kind, EventKind::ToolCall);
        assert_eq!(first.content, "Using tool: echo");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.kind, EventKind::ToolResult);
        assert_eq!(second.content, "Tool echo completed");
        assert!(rx.try_recv().is_err(), "exactly one event pair");
    }

    #[test]
    fn interceptor_pairs_events_on_handler_error() {
        let (sink, mut rx) = EventSink::channel();
        let spec = tool_with_handler(
            "flaky",
            Arc::new(|_| {
                Err(crate::tools::ToolError::FileNotFound {
                    path: "/tmp/gone.txt".into(),
                })
            }),
        );

        let value = Intercepted::new(&spec, &sink).invoke(&json!({}));
        assert_eq!(value["error"], "file not found: /tmp/gone.txt");

        assert_eq!(rx.try_recv().unwrap().kind, EventKind::ToolCall);
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::ToolResult);
        assert!(rx.try_recv().is_err(), "error results still pair events");
    }

    #[test]
    fn sink_survives_dropped_observer() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.thinking("still fine");
        sink.completed();
    }
}
