//! Agent core error types.
//!
//! Tool-level failures are not here: a tool handler reports a structured
//! `tools::ToolError` that the interceptor hands back to the model as
//! data. These variants cover the faults the orchestration layer itself
//! has to contain.

use thiserror::Error;

/// Errors raised inside the orchestration layer.
///
/// None of these propagate past the session controller boundary: `chat`
/// folds them into an error `ChatResult`, `configure` returns them to the
/// caller while keeping the previous binding active.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The inference backend could not be reached at all.
    #[error("backend unreachable: {reason}")]
    BackendUnreachable { reason: String },

    /// A pipeline stage's backend call faulted unexpectedly.
    #[error("stage '{stage}' failed: {reason}")]
    StageInvocation { stage: String, reason: String },

    /// A model/backend rebind could not be applied.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },
}

impl AgentError {
    /// Shorthand for a stage fault.
    pub fn stage(stage: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        AgentError::StageInvocation {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_identify_the_failure_site() {
        let err = AgentError::stage("reader", "connection refused");
        assert_eq!(err.to_string(), "stage 'reader' failed: connection refused");

        let err = AgentError::Configuration {
            reason: "model 'nope' is not installed".into(),
        };
        assert!(err.to_string().starts_with("configuration error"));
    }
}
