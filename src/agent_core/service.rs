//! Session controller.
//!
//! Owns the backend binding (client + sub-agents), the shared working
//! document, and the per-controller turn gate. `chat` is the single entry
//! point for a conversation turn; nothing below it is allowed to leak a
//! fault past this boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as TokioMutex;

use crate::inference::{BackendConfig, OllamaClient};
use crate::tools::{builtin_catalogue, DocumentStore, FileParser};

use super::capabilities::{CapabilityRole, CapabilitySet};
use super::errors::AgentError;
use super::events::EventSink;
use super::pipeline::{self, TurnAgents};
use super::subagent::SubAgent;
use super::types::{AgentMode, ChatResult, ChatTurn, ConnectionStatus};

// ─── Binding ────────────────────────────────────────────────────────────────

/// One backend configuration rendered into live sub-agents. Replaced as a
/// whole on reconfigure; never mutated in place.
#[derive(Debug, Clone)]
struct Binding {
    config: BackendConfig,
    client: OllamaClient,
    agents: TurnAgents,
}

// ─── AgentService ───────────────────────────────────────────────────────────

/// The session controller: dispatches chat turns to mode pipelines and
/// owns the working document they may mutate.
pub struct AgentService {
    binding: Mutex<Binding>,
    connected: AtomicBool,
    document: DocumentStore,
    parser: Arc<dyn FileParser>,
    events: EventSink,
    /// Serializes turn acceptance: at most one `chat` turn may be in
    /// flight per controller, and `configure` is rejected mid-turn.
    turn_gate: TokioMutex<()>,
}

impl AgentService {
    /// Build a controller for `config`.
    ///
    /// `events` receives the per-turn progress stream; `document` is this
    /// controller's working document (create it with
    /// [`DocumentStore::new`] and keep the receiver for replaced
    /// notifications); `parser` is the file-content extraction
    /// collaborator handed to the `read_file` tool.
    pub fn new(
        config: BackendConfig,
        events: EventSink,
        document: DocumentStore,
        parser: Arc<dyn FileParser>,
    ) -> Result<Self, AgentError> {
        let binding = build_binding(config, &events, &document, &parser)?;
        Ok(Self {
            binding: Mutex::new(binding),
            connected: AtomicBool::new(false),
            document,
            parser,
            events,
            turn_gate: TokioMutex::new(()),
        })
    }

    /// The currently active model name.
    pub fn current_model(&self) -> String {
        self.lock_binding().config.model.clone()
    }

    /// The currently active backend URL.
    pub fn backend_url(&self) -> String {
        self.lock_binding().config.backend_url.clone()
    }

    /// Current working document text.
    pub fn working_document(&self) -> String {
        self.document.snapshot()
    }

    /// Replace the working document from outside the pipelines (e.g. a
    /// manual edit in the preview). Full overwrite, observer notified.
    pub fn set_working_document(&self, text: impl Into<String>) {
        self.document.replace(text);
    }

    // ─── Configuration ───────────────────────────────────────────────────

    /// Rebind to a new model/backend pair.
    ///
    /// Validates the backend is reachable and the model installed before
    /// swapping anything; on any failure the previous binding stays
    /// active and the error is returned to the caller. Rejected while a
    /// turn is in flight so no sub-agent is rebound mid-pipeline.
    pub async fn configure(
        &self,
        model: impl Into<String>,
        backend_url: impl Into<String>,
    ) -> Result<(), AgentError> {
        let _gate = self.turn_gate.try_lock().map_err(|_| AgentError::Configuration {
            reason: "a chat turn is in flight; retry after it completes".to_string(),
        })?;

        let candidate = BackendConfig::new(backend_url, model);

        let probe = OllamaClient::new(&candidate.backend_url).map_err(|e| {
            AgentError::Configuration {
                reason: e.to_string(),
            }
        })?;
        let models = probe
            .list_models()
            .await
            .map_err(|e| AgentError::Configuration {
                reason: format!("backend unreachable at {}: {e}", candidate.backend_url),
            })?;
        let names: Vec<String> = models.into_iter().map(|m| m.name).collect();
        if !names.iter().any(|name| name == &candidate.model) {
            return Err(AgentError::Configuration {
                reason: format!(
                    "model '{}' is not installed on the backend (available: {})",
                    candidate.model,
                    names.join(", ")
                ),
            });
        }

        let binding = build_binding(candidate, &self.events, &self.document, &self.parser)?;
        tracing::info!(
            model = %binding.config.model,
            backend = %binding.config.backend_url,
            "rebound sub-agents to new configuration"
        );
        *self.lock_binding() = binding;
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    // ─── Health ──────────────────────────────────────────────────────────

    /// Probe the backend and report availability plus installed models.
    /// Never fails: network trouble comes back as `connected: false` with
    /// a diagnostic message.
    pub async fn check_backend_health(&self) -> ConnectionStatus {
        let client = self.lock_binding().client.clone();
        match client.list_models().await {
            Ok(models) => {
                let names: Vec<String> = models.into_iter().map(|m| m.name).collect();
                tracing::info!(model_count = names.len(), "backend reachable");
                self.connected.store(true, Ordering::SeqCst);
                ConnectionStatus {
                    connected: true,
                    models: names,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "backend not reachable");
                self.connected.store(false, Ordering::SeqCst);
                ConnectionStatus {
                    connected: false,
                    models: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    // ─── Chat ────────────────────────────────────────────────────────────

    /// Run one conversation turn. The single entry point.
    ///
    /// All internal failures are captured and reported through the
    /// returned [`ChatResult`]; this method never panics the turn away.
    pub async fn chat(&self, turn: ChatTurn) -> ChatResult {
        // Serialize turn acceptance: a second concurrent call is rejected
        // rather than racing this one on the working document.
        let Ok(_gate) = self.turn_gate.try_lock() else {
            tracing::warn!("rejected chat call: another turn is in flight");
            return ChatResult::error("another chat turn is already in flight");
        };

        // Lazily re-check the backend when the last probe failed.
        if !self.connected.load(Ordering::SeqCst) {
            let status = self.check_backend_health().await;
            if !status.connected {
                let err = AgentError::BackendUnreachable {
                    reason: status
                        .error
                        .unwrap_or_else(|| "no diagnostic available".to_string()),
                };
                tracing::warn!(error = %err, "chat short-circuited before any stage");
                return ChatResult::error(format!(
                    "{err}. Please ensure Ollama is running."
                ));
            }
        }

        let agents = self.lock_binding().agents.clone();
        let context = self.assemble_context(&turn);

        tracing::info!(
            mode = turn.mode.as_str(),
            file_count = turn.files.len(),
            "dispatching chat turn"
        );

        let outcome = pipeline::run(turn.mode, &context, &agents, &self.events).await;

        tracing::info!(mode = turn.mode.as_str(), phase = ?outcome.phase, "turn finished");
        ChatResult::success(outcome.response, turn.files)
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    /// Assemble the context string the pipelines see.
    ///
    /// Analyze & Generate gets the attachment list; the other modes get
    /// the current document preview. This is where the Document Refiner's
    /// document context comes from; the pipeline itself never injects it.
    fn assemble_context(&self, turn: &ChatTurn) -> String {
        match turn.mode {
            AgentMode::AnalyzeGenerate => {
                let file_context = if turn.files.is_empty() {
                    "No files".to_string()
                } else {
                    let lines: Vec<String> = turn
                        .files
                        .iter()
                        .map(|f| format!("- {} ({})", f.name, f.path))
                        .collect();
                    format!("Files:\n{}", lines.join("\n"))
                };
                format!("Context:\n{file_context}\n\nUser: {}", turn.message)
            }
            AgentMode::DocumentRefiner | AgentMode::Help => {
                let document = self.document.snapshot();
                let document_context = if document.is_empty() {
                    "No document preview".to_string()
                } else {
                    format!("Current document preview:\n{document}")
                };
                format!("Context:\n{document_context}\n\nUser: {}", turn.message)
            }
        }
    }

    fn lock_binding(&self) -> std::sync::MutexGuard<'_, Binding> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Render a config into a client and the three role-bound sub-agents.
fn build_binding(
    config: BackendConfig,
    events: &EventSink,
    document: &DocumentStore,
    parser: &Arc<dyn FileParser>,
) -> Result<Binding, AgentError> {
    let client = OllamaClient::new(&config.backend_url).map_err(|e| AgentError::Configuration {
        reason: e.to_string(),
    })?;
    let catalogue = builtin_catalogue(parser.clone(), document.clone());

    let agent = |role| {
        SubAgent::new(
            client.clone(),
            config.model.clone(),
            CapabilitySet::bind(role, &catalogue),
            events.clone(),
        )
    };

    Ok(Binding {
        agents: TurnAgents {
            reader: agent(CapabilityRole::Reader),
            writer: agent(CapabilityRole::Writer),
            help: agent(CapabilityRole::None),
        },
        client,
        config,
    })
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::PlainTextParser;

    fn service_at(
        url: &str,
    ) -> (
        AgentService,
        tokio::sync::mpsc::UnboundedReceiver<crate::agent_core::events::AgentEvent>,
    ) {
        let (events, event_rx) = EventSink::channel();
        let (document, _doc_rx) = DocumentStore::new();
        let service = AgentService::new(
            BackendConfig::new(url, "qwen3:8b"),
            events,
            document,
            Arc::new(PlainTextParser),
        )
        .unwrap();
        (service, event_rx)
    }

    #[test]
    fn new_service_reports_its_config() {
        let (service, _rx) = service_at("http://127.0.0.1:1");
        assert_eq!(service.current_model(), "qwen3:8b");
        assert_eq!(service.backend_url(), "http://127.0.0.1:1");
        assert_eq!(service.working_document(), "");
    }

    #[test]
    fn set_working_document_overwrites() {
        let (service, _rx) = service_at("http://127.0.0.1:1");
        service.set_working_document("# Draft");
        service.set_working_document("# Final");
        assert_eq!(service.working_document(), "# Final");
    }

    #[tokio::test]
    async fn health_check_reports_unreachable_backend() {
        let (service, _rx) = service_at("http://127.0.0.1:1");
        let status = service.check_backend_health().await;
        assert!(!status.connected);
        assert!(status.models.is_empty());
        assert!(status.error.is_some());
    }

    #[tokio::test]
    async fn chat_short_circuits_when_backend_unreachable() {
        let (service, mut event_rx) = service_at("http://127.0.0.1:1");
        let result = service
            .chat(ChatTurn::new("hello", AgentMode::Help))
            .await;
        assert!(result.is_error());
        assert!(result
            .error_message()
            .unwrap()
            .contains("backend unreachable"));
        assert!(
            event_rx.try_recv().is_err(),
            "no events may be emitted before any stage runs"
        );
    }

    #[tokio::test]
    async fn configure_against_unreachable_backend_keeps_prior_binding() {
        let (service, _rx) = service_at("http://127.0.0.1:1");
        let err = service
            .configure("other-model", "http://127.0.0.1:2")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Configuration { .. }));
        // Prior binding still active.
        assert_eq!(service.current_model(), "qwen3:8b");
        assert_eq!(service.backend_url(), "http://127.0.0.1:1");
    }

    #[test]
    fn context_assembly_lists_files_for_analyze_generate() {
        let (service, _rx) = service_at("http://127.0.0.1:1");
        let turn = ChatTurn::with_files(
            "summarize uploaded.txt",
            vec![crate::agent_core::types::FileRef {
                name: "uploaded.txt".into(),
                path: "/tmp/uploaded.txt".into(),
                size: 120,
            }],
            AgentMode::AnalyzeGenerate,
        );
        let context = service.assemble_context(&turn);
        assert!(context.starts_with("Context:\nFiles:\n- uploaded.txt (/tmp/uploaded.txt)"));
        assert!(context.ends_with("User: summarize uploaded.txt"));
    }

    #[test]
    fn context_assembly_degenerates_to_no_files() {
        let (service, _rx) = service_at("http://127.0.0.1:1");
        let turn = ChatTurn::new("make something up", AgentMode::AnalyzeGenerate);
        let context = service.assemble_context(&turn);
        assert!(context.contains("No files"));
    }

    #[test]
    fn context_assembly_embeds_document_for_refiner() {
        let (service, _rx) = service_at("http://127.0.0.1:1");
        service.set_working_document("# Current doc");
        let turn = ChatTurn::new("tighten the intro", AgentMode::DocumentRefiner);
        let context = service.assemble_context(&turn);
        assert!(context.contains("Current document preview:\n# Current doc"));
        assert!(context.contains("User: tighten the intro"));

        service.set_working_document("");
        let context = service.assemble_context(&turn);
        assert!(context.contains("No document preview"));
    }
}
