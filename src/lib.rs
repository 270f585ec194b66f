//! Docsmith: local-first documentation agent core.
//!
//! Routes a user's request, optional file attachments, and a persisted
//! working document through one of three fixed model pipelines, each
//! restricted to its own capability set, against a local Ollama backend.
//! The embedding shell (UI, IPC, format-specific parsers) plugs in at the
//! seams: the event and document channels, and the `FileParser` trait.

pub mod agent_core;
pub mod inference;
pub mod tools;

pub use agent_core::{
    AgentError, AgentEvent, AgentMode, AgentService, ChatResult, ChatTurn, ConnectionStatus,
    EventKind, EventSink, FileRef,
};
pub use inference::BackendConfig;
pub use tools::{DocumentStore, FileParser, PlainTextParser};

/// Return the platform-standard data directory for Docsmith.
///
/// Falls back to `~/.docsmith/` only if the platform data directory
/// cannot be resolved.
pub fn data_dir() -> std::path::PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("com.docsmith.app");
    }
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".docsmith")
}

/// Initialize the tracing subscriber for an embedding shell.
///
/// Writes structured logs to `docsmith.log` under [`data_dir`], honoring
/// `RUST_LOG` when set and defaulting to `docsmith=info,warn`. Safe to
/// call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("docsmith=info,warn"));

    let log_dir = data_dir();
    let _ = std::fs::create_dir_all(&log_dir);
    let log_path = log_dir.join("docsmith.log");

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    match file {
        Ok(file) => {
            let initialized = fmt::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .try_init()
                .is_ok();
            if initialized {
                tracing::info!(
                    version = env!("CARGO_PKG_VERSION"),
                    log_file = %log_path.display(),
                    "docsmith core starting"
                );
            }
        }
        Err(_) => {
            // No writable data dir (sandboxed test runs): log to stderr.
            let _ = fmt::fmt().with_env_filter(filter).with_ansi(false).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn data_dir_is_absolute_or_dot_fallback() {
        let dir = super::data_dir();
        assert!(!dir.as_os_str().is_empty());
    }

    #[test]
    fn init_tracing_is_idempotent() {
        super::init_tracing();
        super::init_tracing();
    }
}
