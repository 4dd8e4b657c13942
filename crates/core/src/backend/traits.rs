//! Trait definitions for the backend module.

use async_trait::async_trait;
use std::path::Path;

use super::error::BackendError;
use super::types::OpenOptions;
use crate::document::SourceFormat;

/// The native rendering engine's narrow contract.
///
/// Engines are not safe for concurrent use. Methods take `&mut self` and
/// implementations are only ever driven from the execution lane's worker.
pub trait RenderEngine: Send + 'static {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Sets up the per-call engine context.
    fn acquire(&mut self) -> Result<(), BackendError>;

    /// Opens an input document.
    fn open(
        &mut self,
        path: &Path,
        format: SourceFormat,
        options: &OpenOptions,
    ) -> Result<(), BackendError>;

    /// Writes the open document as PDF.
    fn save_pdf(&mut self, output: &Path) -> Result<(), BackendError>;

    /// Closes the open document without saving it.
    fn close_document(&mut self);

    /// Tears down the per-call context. Must be safe to call after any
    /// failure.
    fn release(&mut self);
}

/// Converts one document to PDF, reporting only success or failure.
#[async_trait]
pub trait PdfBackend: Send + Sync {
    /// Returns the name of this backend.
    fn name(&self) -> &str;

    /// Converts `input` to a PDF at `output`.
    async fn convert(&self, input: &Path, output: &Path) -> bool;
}
