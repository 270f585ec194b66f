//! Capability tools: the fixed catalogue of side-effecting operations.
//!
//! Submodules:
//! - `catalogue`: `ToolSpec`, handler signature, and the startup catalogue
//! - `fs_tools`: read-only filesystem inspection (`read_file`,
//!   `list_files`, `get_file_info`) plus the `FileParser` extraction seam
//! - `document`: the shared working document and `update_documentation`
//! - `errors`: structured tool failure values

pub mod catalogue;
pub mod document;
pub mod errors;
pub mod fs_tools;

// Re-exports for convenience
pub use catalogue::{
    builtin_catalogue, ToolSpec, GET_FILE_INFO, LIST_FILES, READ_FILE, UPDATE_DOCUMENTATION,
};
pub use document::DocumentStore;
pub use errors::ToolError;
pub use fs_tools::{FileParser, ParsedFile, PlainTextParser};
