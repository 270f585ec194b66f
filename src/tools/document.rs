//! The shared working document and its mutation tool.
//!
//! `DocumentStore` is the single mutable resource shared between a turn's
//! tool invocations and the caller. It is owned by one session controller
//! and handed to the writer sub-agent's tool as an explicit write handle.
//! There is no global registration, so two controllers can never cross
//! their document updates.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{json, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::catalogue::{ToolHandler, ToolSpec, UPDATE_DOCUMENTATION};
use super::errors::ToolError;

// ─── DocumentStore ──────────────────────────────────────────────────────────

/// Cloneable handle on the working document snapshot.
///
/// Every `replace` swaps the full text atomically and pushes the new
/// snapshot onto the document-replaced channel for the UI observer.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    text: Arc<RwLock<String>>,
    replaced_tx: UnboundedSender<String>,
}

impl DocumentStore {
    /// Create an empty store plus the receiving end of its
    /// document-replaced notifications.
    pub fn new() -> (Self, UnboundedReceiver<String>) {
        let (replaced_tx, replaced_rx) = mpsc::unbounded_channel();
        (
            Self {
                text: Arc::new(RwLock::new(String::new())),
                replaced_tx,
            },
            replaced_rx,
        )
    }

    /// Replace the document with `text`. Full overwrite, no merging.
    pub fn replace(&self, text: impl Into<String>) {
        let text = text.into();
        {
            let mut guard = self
                .text
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *guard = text.clone();
        }
        // The observer may be gone (headless use); that is not an error.
        let _ = self.replaced_tx.send(text);
    }

    /// Current document text.
    pub fn snapshot(&self) -> String {
        self.text
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ─── Tool Spec ──────────────────────────────────────────────────────────────

/// Build the `update_documentation` tool bound to one controller's store.
pub fn update_documentation_tool(document: DocumentStore) -> ToolSpec {
    let handler: ToolHandler = Arc::new(move |args: &Value| {
        let content = args
            .get("content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments {
                reason: "missing required string argument 'content'".to_string(),
            })?;
        document.replace(content);
        tracing::info!(length = content.len(), "working document replaced");
        Ok(json!({ "success": true, "message": "Documentation updated" }))
    });

    ToolSpec {
        name: UPDATE_DOCUMENTATION,
        description: "Update the documentation with the generated markdown content. \
                      Call this when you have created or modified the documentation \
                      you want to show to the user."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The complete markdown documentation content"
                }
            },
            "required": ["content"]
        }),
        handler,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_overwrites_and_notifies() {
        let (store, mut rx) = DocumentStore::new();
        assert_eq!(store.snapshot(), "");

        store.replace("# First");
        store.replace("# Second");

        assert_eq!(store.snapshot(), "# Second");
        assert_eq!(rx.try_recv().unwrap(), "# First");
        assert_eq!(rx.try_recv().unwrap(), "# Second");
    }

    #[test]
    fn replace_survives_dropped_observer() {
        let (store, rx) = DocumentStore::new();
        drop(rx);
        store.replace("# Still fine");
        assert_eq!(store.snapshot(), "# Still fine");
    }

    #[test]
    fn tool_writes_through_its_bound_store() {
        let (store, _rx) = DocumentStore::new();
        let spec = update_documentation_tool(store.clone());

        let result = (spec.handler)(&json!({"content": "# Generated"})).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(store.snapshot(), "# Generated");
    }

    #[test]
    fn tool_rejects_missing_content() {
        let (store, _rx) = DocumentStore::new();
        let spec = update_documentation_tool(store.clone());

        let err = (spec.handler)(&json!({})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
        assert_eq!(store.snapshot(), "", "failed call must not touch the document");
    }

    #[test]
    fn stores_are_instance_scoped() {
        let (store_a, _rx_a) = DocumentStore::new();
        let (store_b, _rx_b) = DocumentStore::new();
        let tool_a = update_documentation_tool(store_a.clone());

        (tool_a.handler)(&json!({"content": "# A only"})).unwrap();
        assert_eq!(store_a.snapshot(), "# A only");
        assert_eq!(store_b.snapshot(), "", "no cross-instance leakage");
    }
}
