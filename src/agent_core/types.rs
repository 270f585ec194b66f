//! Shared types for the agent core.
//!
//! Modes, turns, attachments, results, and the per-turn state machine
//! used across the pipelines and the session controller.

use serde::{Deserialize, Serialize};

// ─── Modes ──────────────────────────────────────────────────────────────────

/// The orchestration script a conversation turn runs under.
///
/// Selected explicitly by the caller per turn; the dispatcher never
/// infers a mode from message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentMode {
    /// Two stages: read attached files, then generate documentation.
    #[serde(rename = "analyze-generate")]
    AnalyzeGenerate,
    /// Single stage: rewrite the working document per the user's request.
    #[serde(rename = "document-refiner")]
    DocumentRefiner,
    /// Single stage, no tools: answer questions about the application.
    #[serde(rename = "help")]
    Help,
}

impl AgentMode {
    /// Wire/display name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentMode::AnalyzeGenerate => "analyze-generate",
            AgentMode::DocumentRefiner => "document-refiner",
            AgentMode::Help => "help",
        }
    }
}

// ─── Turns ──────────────────────────────────────────────────────────────────

/// An attached file. Only metadata crosses this boundary; content
/// extraction happens through the `read_file` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Display name (e.g. `report.pdf`).
    pub name: String,
    /// Filesystem path the `read_file` tool will receive.
    pub path: String,
    /// Size in bytes, as reported by the file-selection collaborator.
    pub size: u64,
}

/// One user request: message text, attachments, and the selected mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub message: String,
    #[serde(default)]
    pub files: Vec<FileRef>,
    pub mode: AgentMode,
}

impl ChatTurn {
    /// A turn without attachments.
    pub fn new(message: impl Into<String>, mode: AgentMode) -> Self {
        Self {
            message: message.into(),
            files: Vec::new(),
            mode,
        }
    }

    /// A turn with attachments.
    pub fn with_files(message: impl Into<String>, files: Vec<FileRef>, mode: AgentMode) -> Self {
        Self {
            message: message.into(),
            files,
            mode,
        }
    }
}

// ─── Results ────────────────────────────────────────────────────────────────

/// Outcome of one chat turn. All internal faults are folded into the
/// `Error` variant; nothing escapes the session controller as a panic or
/// an `Err`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResult {
    /// The turn ran to a terminal state.
    Success {
        /// The model's final chat text (the document itself travels via
        /// the document-replaced notification, not here).
        response: String,
        /// The attachments echoed back for the caller's bookkeeping.
        files: Vec<FileRef>,
    },
    /// The turn could not run.
    Error { error: String },
}

impl ChatResult {
    pub fn success(response: impl Into<String>, files: Vec<FileRef>) -> Self {
        ChatResult::Success {
            response: response.into(),
            files,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ChatResult::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ChatResult::Error { .. })
    }

    /// The response text, if the turn succeeded.
    pub fn response(&self) -> Option<&str> {
        match self {
            ChatResult::Success { response, .. } => Some(response),
            ChatResult::Error { .. } => None,
        }
    }

    /// The error message, if the turn failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ChatResult::Success { .. } => None,
            ChatResult::Error { error } => Some(error),
        }
    }
}

/// Backend availability as reported by `check_backend_health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    /// Installed model names, empty when unreachable.
    #[serde(default)]
    pub models: Vec<String>,
    /// Diagnostic message when unreachable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ─── Turn State Machine ─────────────────────────────────────────────────────

/// Lifecycle of one pipeline turn.
///
/// `Failed` on a non-final stage does not appear here as a terminal state:
/// the pipeline degrades and moves to the next stage instead. Only a
/// final-stage fault terminates a turn as `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Pending,
    StageRunning(usize),
    Completed,
    Failed,
}

impl TurnPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnPhase::Completed | TurnPhase::Failed)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_serializes_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&AgentMode::AnalyzeGenerate).unwrap(),
            "\"analyze-generate\""
        );
        assert_eq!(
            serde_json::to_string(&AgentMode::DocumentRefiner).unwrap(),
            "\"document-refiner\""
        );
        assert_eq!(serde_json::to_string(&AgentMode::Help).unwrap(), "\"help\"");
    }

    #[test]
    fn mode_round_trips() {
        for mode in [
            AgentMode::AnalyzeGenerate,
            AgentMode::DocumentRefiner,
            AgentMode::Help,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            let back: AgentMode = serde_json::from_str(&json).unwrap();
            assert_eq!(back, mode);
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn chat_result_success_shape() {
        let result = ChatResult::success(
            "done",
            vec![FileRef {
                name: "a.txt".into(),
                path: "/tmp/a.txt".into(),
                size: 3,
            }],
        );
        assert!(!result.is_error());
        assert_eq!(result.response(), Some("done"));
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"response\":\"done\""));
        assert!(json.contains("\"files\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn chat_result_error_shape() {
        let result = ChatResult::error("backend is not connected");
        assert!(result.is_error());
        assert_eq!(result.error_message(), Some("backend is not connected"));
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"error":"backend is not connected"}"#);
    }

    #[test]
    fn turn_phase_terminal_states() {
        assert!(!TurnPhase::Pending.is_terminal());
        assert!(!TurnPhase::StageRunning(0).is_terminal());
        assert!(TurnPhase::Completed.is_terminal());
        assert!(TurnPhase::Failed.is_terminal());
    }
}
