//! Read-only filesystem inspection tools.
//!
//! `read_file` delegates content extraction to a [`FileParser`]
//! collaborator so format-specific readers (PDF, DOCX) can be plugged in
//! by the embedding shell. `list_files` and `get_file_info` are handled
//! in-process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use super::catalogue::{GET_FILE_INFO, LIST_FILES, READ_FILE, ToolHandler, ToolSpec};
use super::errors::ToolError;

// ─── Constants ──────────────────────────────────────────────────────────────

/// Maximum characters extracted from a single file.
///
/// Long documents are cut here so one attachment cannot consume the whole
/// context window; the truncation flag tells the model content is missing.
const MAX_EXTRACT_CHARS: usize = 10_000;

// ─── File Parsing Seam ──────────────────────────────────────────────────────

/// Extracted file content plus truncation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedFile {
    /// Extracted text, possibly truncated.
    pub content: String,
    /// Whether `content` was cut at the extraction cap.
    pub truncated: bool,
    /// Length of the full extracted text in bytes.
    pub original_length: usize,
}

/// Format-specific file content extraction.
///
/// The crate ships [`PlainTextParser`]; richer formats (PDF, DOCX) are
/// provided by the embedding shell through this trait.
pub trait FileParser: Send + Sync {
    /// Extract text from `path`, cutting at `max_chars`.
    fn parse(&self, path: &Path, max_chars: usize) -> Result<ParsedFile, ToolError>;

    /// Extensions (lowercase, without the dot) this parser handles.
    fn supported_extensions(&self) -> &[&str];
}

/// Parser for plain-text formats.
#[derive(Debug, Default)]
pub struct PlainTextParser;

impl FileParser for PlainTextParser {
    fn parse(&self, path: &Path, max_chars: usize) -> Result<ParsedFile, ToolError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !self.supported_extensions().contains(&extension.as_str()) {
            return Err(ToolError::UnsupportedFormat {
                path: path.display().to_string(),
                extension,
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ToolError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let original_length = content.len();
        let clipped = truncate_utf8(&content, max_chars);
        Ok(ParsedFile {
            truncated: clipped.len() < original_length,
            content: clipped.to_string(),
            original_length,
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown", "json"]
    }
}

// ─── Tool Specs ─────────────────────────────────────────────────────────────

/// Build the `read_file` tool bound to the given parser.
pub fn read_file_tool(parser: Arc<dyn FileParser>) -> ToolSpec {
    let description = format!(
        "Read the contents of a file from the local filesystem. Supports: {}. \
         Use this to read uploaded documents.",
        parser.supported_extensions().join(", ")
    );
    let handler: ToolHandler = Arc::new(move |args: &Value| {
        let path = required_str_arg(args, "file_path")?;
        let resolved = expand_tilde(path);
        if !resolved.exists() {
            return Err(ToolError::FileNotFound {
                path: path.to_string(),
            });
        }
        let parsed = parser.parse(&resolved, MAX_EXTRACT_CHARS)?;
        tracing::debug!(
            path = %resolved.display(),
            truncated = parsed.truncated,
            original_length = parsed.original_length,
            "read_file extracted content"
        );
        Ok(json!(parsed))
    });

    ToolSpec {
        name: READ_FILE,
        description,
        parameters: json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The path to the file to read"
                }
            },
            "required": ["file_path"]
        }),
        handler,
    }
}

/// One entry in a `list_files` result.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    pub size: u64,
    pub modified: String,
}

/// Build the `list_files` tool.
pub fn list_files_tool() -> ToolSpec {
    let handler: ToolHandler = Arc::new(|args: &Value| {
        let directory = required_str_arg(args, "directory")?;
        let resolved = expand_tilde(directory);
        if !resolved.is_dir() {
            return Err(ToolError::DirectoryNotFound {
                path: directory.to_string(),
            });
        }

        let read_dir = std::fs::read_dir(&resolved).map_err(|e| ToolError::Io {
            path: directory.to_string(),
            reason: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry_result in read_dir {
            let entry = entry_result.map_err(|e| ToolError::Io {
                path: directory.to_string(),
                reason: e.to_string(),
            })?;
            let metadata = entry.metadata().map_err(|e| ToolError::Io {
                path: entry.path().display().to_string(),
                reason: e.to_string(),
            })?;
            files.push(FileEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path().to_string_lossy().to_string(),
                is_directory: metadata.is_dir(),
                size: metadata.len(),
                modified: system_time_rfc3339(metadata.modified().ok()),
            });
        }

        // Directories first, then files, both alphabetically.
        files.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        Ok(json!({ "files": files }))
    });

    ToolSpec {
        name: LIST_FILES,
        description: "List files in a directory.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "The directory path to list files from"
                }
            },
            "required": ["directory"]
        }),
        handler,
    }
}

/// Build the `get_file_info` tool.
pub fn get_file_info_tool() -> ToolSpec {
    let handler: ToolHandler = Arc::new(|args: &Value| {
        let path = required_str_arg(args, "file_path")?;
        let resolved = expand_tilde(path);
        if !resolved.exists() {
            return Err(ToolError::FileNotFound {
                path: path.to_string(),
            });
        }
        let metadata = std::fs::metadata(&resolved).map_err(|e| ToolError::Io {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let extension = resolved
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        Ok(json!({
            "name": resolved
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            "path": resolved.to_string_lossy(),
            "size": metadata.len(),
            "size_formatted": format_bytes(metadata.len()),
            "extension": extension,
            "is_directory": metadata.is_dir(),
            "created": system_time_rfc3339(metadata.created().ok()),
            "modified": system_time_rfc3339(metadata.modified().ok()),
        }))
    });

    ToolSpec {
        name: GET_FILE_INFO,
        description: "Get detailed information about a file.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The path to the file"
                }
            },
            "required": ["file_path"]
        }),
        handler,
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Pull a required string argument out of the tool call payload.
fn required_str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArguments {
            reason: format!("missing required string argument '{key}'"),
        })
}

/// Expand a leading `~` against the user's home directory.
pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~/").unwrap_or(path));
        }
    }
    PathBuf::from(path)
}

/// Truncate a string to at most `max_bytes` bytes on a valid UTF-8 char
/// boundary.
pub(crate) fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Render a byte count as a human-readable size.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exponent as i32);
    format!("{:.2} {}", value, UNITS[exponent])
}

/// Render an optional system time as RFC 3339, empty when unavailable.
fn system_time_rfc3339(time: Option<std::time::SystemTime>) -> String {
    time.map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339())
        .unwrap_or_default()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
