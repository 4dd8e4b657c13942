//! Error types for the backend module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a rendering engine. They never leave [`BackendAdapter`].
///
/// [`BackendAdapter`]: super::BackendAdapter
#[derive(Debug, Error)]
pub enum BackendError {
    /// The engine program could not be found.
    #[error("Engine program not found: {path}")]
    ProgramNotFound { path: PathBuf },

    /// The per-call engine context could not be set up.
    #[error("Engine context unavailable: {reason}")]
    ContextUnavailable { reason: String },

    /// The engine was asked to export before a document was opened.
    #[error("No document is open")]
    NoDocument,

    /// The input document could not be opened.
    #[error("Failed to open {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    /// The PDF export failed.
    #[error("PDF export failed: {reason}")]
    ExportFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The engine exceeded its hard deadline and was killed.
    #[error("Engine timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while driving the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// Creates an export failure with optional captured stderr.
    pub fn export_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ExportFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a context failure.
    pub fn context_unavailable(reason: impl Into<String>) -> Self {
        Self::ContextUnavailable {
            reason: reason.into(),
        }
    }
}
