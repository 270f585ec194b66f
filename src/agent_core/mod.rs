//! Agent core: the orchestration layer.
//!
//! Submodules:
//! - `service`: the session controller, single entry point for chat turns
//! - `pipeline`: the three mode scripts and the per-turn state machine
//! - `subagent`: one model binding restricted to a fixed capability set
//! - `capabilities`: per-role tool authorization
//! - `events`: progress event stream and the tool invocation interceptor
//! - `types`: modes, turns, attachments, results
//! - `errors`: orchestration-level error types

pub mod capabilities;
pub mod errors;
pub mod events;
pub(crate) mod pipeline;
pub mod service;
pub mod subagent;
pub mod types;

// Re-exports for convenience
pub use capabilities::{CapabilityRole, CapabilitySet};
pub use errors::AgentError;
pub use events::{AgentEvent, EventKind, EventSink};
pub use service::AgentService;
pub use subagent::SubAgent;
pub use types::{AgentMode, ChatResult, ChatTurn, ConnectionStatus, FileRef, TurnPhase};
