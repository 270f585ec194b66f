//! The capability tool catalogue.
//!
//! Every side effect a model may trigger is a named [`ToolSpec`] defined
//! here, once, at startup. Sub-agents never see the full catalogue; they
//! are handed a role-filtered subset by the orchestration layer.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::inference::types::{FunctionDefinition, ToolDefinition};

use super::document::{update_documentation_tool, DocumentStore};
use super::errors::ToolError;
use super::fs_tools::{get_file_info_tool, list_files_tool, read_file_tool, FileParser};

// ─── Tool Names ─────────────────────────────────────────────────────────────

/// Read one attached file through the file-parsing collaborator.
pub const READ_FILE: &str = "read_file";

/// List a directory's entries with metadata.
pub const LIST_FILES: &str = "list_files";

/// Inspect a single file's metadata.
pub const GET_FILE_INFO: &str = "get_file_info";

/// Replace the shared working document. The only mutating tool.
pub const UPDATE_DOCUMENTATION: &str = "update_documentation";

// ─── ToolSpec ───────────────────────────────────────────────────────────────

/// Handler signature shared by all catalogue tools.
///
/// Handlers are synchronous and total: every failure comes back as a
/// structured [`ToolError`], never a panic or an escalating fault.
pub type ToolHandler = Arc<dyn Fn(&Value) -> Result<Value, ToolError> + Send + Sync>;

/// One named capability: metadata for the model plus the handler that
/// performs the side effect.
#[derive(Clone)]
pub struct ToolSpec {
    /// Tool name as presented to the model.
    pub name: &'static str,
    /// Tool description as presented to the model.
    pub description: String,
    /// JSON schema for the tool's arguments.
    pub parameters: Value,
    /// The operation itself.
    pub handler: ToolHandler,
}

impl ToolSpec {
    /// Render this spec as a wire-format tool definition.
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            r#type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name.to_string(),
                description: self.description.clone(),
                parameters: self.parameters.clone(),
            },
        }
    }
}

impl fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSpec").field("name", &self.name).finish()
    }
}

// ─── Catalogue ──────────────────────────────────────────────────────────────

/// Build the full tool catalogue for one session controller.
///
/// `parser` is the file-content extraction collaborator; `document` is the
/// controller-scoped write handle for the working document. Binding the
/// handle here (rather than through any global registration) keeps
/// document writes scoped to the owning controller instance.
pub fn builtin_catalogue(parser: Arc<dyn FileParser>, document: DocumentStore) -> Vec<ToolSpec> {
    vec![
        read_file_tool(parser),
        list_files_tool(),
        get_file_info_tool(),
        update_documentation_tool(document),
    ]
}

// ─── Tests ──────────────────────────────────────────────────────────────────
