//! Inference client: the Ollama HTTP API binding.
//!
//! This module handles all communication with the local model endpoint:
//! - Non-streaming chat requests with optional tool definitions
//! - Model listing (`GET /api/tags`), doubling as the health probe
//! - Backend configuration from environment variables
//!
//! The client speaks the native Ollama chat API, so switching models is a
//! config change, not a code change.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-exports for convenience
pub use client::OllamaClient;
pub use config::BackendConfig;
pub use errors::InferenceError;
pub use types::{ChatMessage, ChatResponse, ModelDescriptor, Role, ToolCall, ToolDefinition};
