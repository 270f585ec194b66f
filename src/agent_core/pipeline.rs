//! Mode pipelines: the three fixed orchestration scripts.
//!
//! The dispatcher selects a script purely from the turn's mode. Stages
//! run strictly in sequence; a stage fault is an explicit outcome the
//! dispatcher inspects, not an exception. A failed non-final stage
//! degrades the next stage's input (Analyze & Generate); a failed final
//! stage terminates the turn with an empty response. The `completed`
//! event closes every terminal path.

use crate::inference::ChatMessage;

use super::errors::AgentError;
use super::events::EventSink;
use super::subagent::SubAgent;
use super::types::{AgentMode, TurnPhase};

// ─── Stage Prompts ──────────────────────────────────────────────────────────

/// Stage G instruction for Analyze & Generate. The document-update call
/// is mandatory: text-only output is not a valid terminal state for a
/// writer stage.
const GENERATE_PROMPT: &str = "\
You are a documentation writer. Based on the file contents above, write \
comprehensive markdown documentation.\n\n\
IMPORTANT: You MUST call the update_documentation tool with the complete \
markdown content. Call it NOW with your generated documentation.";

/// Fixed application description for Help mode. No tools are bound in
/// this mode, so nothing here can mutate the working document.
const HELP_PREAMBLE: &str = "\
You are a helpful assistant for this documentation agent application. \
Provide helpful answers about how to use the app.\n\n\
APPLICATION INFORMATION:\n\
- This is a documentation agent that analyzes uploaded documents and \
generates or refines markdown documentation\n\
- It uses Ollama (a local LLM runtime), so all document processing stays \
on this machine\n\n\
AVAILABLE MODES:\n\
1. Analyze & Generate: attach files (TXT, MD, JSON, plus any format the \
embedding application parses), the agent reads them and generates \
documentation\n\
2. Document Refiner: improve, edit, or continue the documentation shown \
in the preview panel\n\
3. Help: answer questions about how to use this application\n\n\
HOW THE PREVIEW WORKS:\n\
- The preview panel renders the current working document as markdown\n\
- Every agent update replaces the working document as a whole\n\
- Finalize manual edits before asking the Document Refiner to build on \
them";

/// Stage R instruction builder for Analyze & Generate.
fn reader_prompt(context: &str) -> String {
    format!(
        "You are a file reader. Read every file the user has attached, using \
         the read_file tool.\n\n{context}\n\nAfter reading all files, respond \
         with \"DONE\" and a short summary of what you read."
    )
}

/// Single-stage instruction builder for Document Refiner.
fn refine_prompt(context: &str) -> String {
    format!(
        "You are a documentation refiner. The user wants you to improve, edit, \
         or continue their documentation.\n\n{context}\n\n\
         IMPORTANT: You MUST call the update_documentation tool with the \
         refined documentation content. Call it NOW, and always send the \
         complete documentation (the refined parts plus everything unchanged)."
    )
}

/// Help-mode instruction builder.
fn help_prompt(context: &str) -> String {
    format!("{HELP_PREAMBLE}\n\n{context}")
}

// ─── Turn State ─────────────────────────────────────────────────────────────

/// Tracks a turn's progress through the per-turn state machine:
/// `Pending → StageRunning(i) → ... → Completed | Failed`.
struct TurnState {
    phase: TurnPhase,
}

impl TurnState {
    fn new() -> Self {
        Self {
            phase: TurnPhase::Pending,
        }
    }

    fn begin_stage(&mut self, index: usize) {
        tracing::debug!(stage = index, "pipeline stage running");
        self.phase = TurnPhase::StageRunning(index);
    }

    fn complete(&mut self) {
        self.phase = TurnPhase::Completed;
    }

    fn fail(&mut self) {
        self.phase = TurnPhase::Failed;
    }
}

// ─── Dispatch ───────────────────────────────────────────────────────────────

/// The sub-agents a turn runs against, snapshotted from the session
/// controller's current binding.
#[derive(Debug, Clone)]
pub(crate) struct TurnAgents {
    pub reader: SubAgent,
    pub writer: SubAgent,
    pub help: SubAgent,
}

/// Terminal result of a pipeline run.
#[derive(Debug)]
pub(crate) struct TurnOutcome {
    /// The model's final chat text; empty on a failed final stage.
    pub response: String,
    /// Terminal phase of the turn state machine.
    pub phase: TurnPhase,
}

/// Run the pipeline selected by `mode` over the assembled context string.
pub(crate) async fn run(
    mode: AgentMode,
    context: &str,
    agents: &TurnAgents,
    events: &EventSink,
) -> TurnOutcome {
    match mode {
        AgentMode::AnalyzeGenerate => analyze_generate(context, agents, events).await,
        AgentMode::DocumentRefiner => {
            single_stage(
                "refiner",
                "Refining document...",
                refine_prompt(context),
                &agents.writer,
                events,
            )
            .await
        }
        AgentMode::Help => {
            single_stage(
                "help",
                "Reading application documentation...",
                help_prompt(context),
                &agents.help,
                events,
            )
            .await
        }
    }
}

/// Invoke one sub-agent as a pipeline stage, converting any backend fault
/// into a `StageInvocation` outcome for the dispatcher to inspect.
async fn run_stage(
    stage: &'static str,
    agent: &SubAgent,
    messages: Vec<ChatMessage>,
) -> Result<Vec<ChatMessage>, AgentError> {
    agent
        .invoke(messages)
        .await
        .map_err(|e| AgentError::stage(stage, e))
}

// ─── Analyze & Generate ─────────────────────────────────────────────────────

/// Two stages: read the attachments, then generate the document.
///
/// A stage R fault degrades stage G's input to nothing instead of
/// aborting the turn; a stage G fault terminates with an empty response.
async fn analyze_generate(context: &str, agents: &TurnAgents, events: &EventSink) -> TurnOutcome {
    let mut state = TurnState::new();

    state.begin_stage(0);
    events.thinking("Reading files...");

    let read_history = match run_stage(
        "reader",
        &agents.reader,
        vec![ChatMessage::user(reader_prompt(context))],
    )
    .await
    {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!(error = %e, "reader stage failed, generating without file context");
            events.error(format!("File reading failed: {e}"));
            Vec::new()
        }
    };

    state.begin_stage(1);
    events.thinking("Generating documentation...");

    let mut messages = read_history;
    messages.push(ChatMessage::user(GENERATE_PROMPT));

    match run_stage("generator", &agents.writer, messages).await {
        Ok(history) => {
            state.complete();
            events.completed();
            TurnOutcome {
                response: last_assistant_text(&history),
                phase: state.phase,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "generator stage failed");
            events.error(format!("Documentation generation failed: {e}"));
            state.fail();
            events.completed();
            TurnOutcome {
                response: String::new(),
                phase: state.phase,
            }
        }
    }
}

// ─── Single-Stage Modes ─────────────────────────────────────────────────────

/// Shared script for Document Refiner and Help: one stage, one agent,
/// empty response on a final-stage fault.
async fn single_stage(
    stage: &'static str,
    thinking: &str,
    prompt: String,
    agent: &SubAgent,
    events: &EventSink,
) -> TurnOutcome {
    let mut state = TurnState::new();

    state.begin_stage(0);
    events.thinking(thinking);

    match run_stage(stage, agent, vec![ChatMessage::user(prompt)]).await {
        Ok(history) => {
            state.complete();
            events.completed();
            TurnOutcome {
                response: last_assistant_text(&history),
                phase: state.phase,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, stage, "stage failed");
            events.error(format!("Request failed: {e}"));
            state.fail();
            events.completed();
            TurnOutcome {
                response: String::new(),
                phase: state.phase,
            }
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// The last non-empty assistant message in a history, or the fallback
/// text when the model produced none.
fn last_assistant_text(history: &[ChatMessage]) -> String {
    history
        .iter()
        .rev()
        .find(|msg| {
            matches!(msg.role, crate::inference::Role::Assistant) && !msg.content.is_empty()
        })
        .map(|msg| msg.content.clone())
        .unwrap_or_else(|| "No response".to_string())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
