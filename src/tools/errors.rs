//! Tool error types.
//!
//! A tool failure is data, not a fault: the interceptor renders these as
//! `{"error": "..."}` results that go back to the model, which may retry
//! or adapt. Nothing here ever escalates past the invocation boundary.

use thiserror::Error;

/// Structured errors reported by tool handlers.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested file does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// The requested directory does not exist (or is not a directory).
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: String },

    /// The file exists but no parser handles its format.
    #[error("unsupported file format '{extension}' for {path}")]
    UnsupportedFormat { path: String, extension: String },

    /// The model supplied arguments that do not match the tool's schema.
    #[error("invalid arguments: {reason}")]
    InvalidArguments { reason: String },

    /// Filesystem access failed.
    #[error("io error on {path}: {reason}")]
    Io { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_path() {
        let err = ToolError::FileNotFound {
            path: "/tmp/missing.txt".into(),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.txt");

        let err = ToolError::UnsupportedFormat {
            path: "/tmp/a.xlsx".into(),
            extension: "xlsx".into(),
        };
        assert!(err.to_string().contains("xlsx"));
    }
}
