//! Adapter that runs one engine conversion and reports a boolean.

use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

use super::error::BackendError;
use super::traits::RenderEngine;
use super::types::OpenOptions;
use crate::document::SourceFormat;
use crate::metrics::BACKEND_INVOCATIONS;

/// Wraps a [`RenderEngine`] and runs the full per-call sequence.
///
/// Every call acquires a fresh engine context and releases it before
/// returning, on success, failure and unwinding alike, so no engine state
/// survives between calls.
pub struct BackendAdapter<E: RenderEngine> {
    engine: E,
}

impl<E: RenderEngine> BackendAdapter<E> {
    /// Creates an adapter around `engine`.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Returns the wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Converts `input` to a PDF at `output`. Never panics on engine errors;
    /// every failure is logged and reported as `false`.
    pub fn convert(&mut self, input: &Path, output: &Path) -> bool {
        let start = Instant::now();
        match self.try_convert(input, output) {
            Ok(()) => {
                BACKEND_INVOCATIONS.with_label_values(&["success"]).inc();
                info!(
                    engine = self.engine.name(),
                    input = %input.display(),
                    output = %output.display(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Converted document to PDF"
                );
                true
            }
            Err(e) => {
                BACKEND_INVOCATIONS.with_label_values(&["failure"]).inc();
                match &e {
                    BackendError::ExportFailed {
                        stderr: Some(stderr),
                        ..
                    } => error!(
                        engine = self.engine.name(),
                        input = %input.display(),
                        stderr = %stderr.trim(),
                        "PDF conversion failed: {}", e
                    ),
                    _ => error!(
                        engine = self.engine.name(),
                        input = %input.display(),
                        "PDF conversion failed: {}", e
                    ),
                }
                false
            }
        }
    }

    fn try_convert(&mut self, input: &Path, output: &Path) -> Result<(), BackendError> {
        // Anything that is not the XML variant is handed over as binary HWP.
        let format = SourceFormat::from_path(input).unwrap_or(SourceFormat::Hwp);

        self.engine.acquire()?;
        let mut session = EngineSession {
            engine: &mut self.engine,
            document_open: false,
        };

        session.engine.open(input, format, &OpenOptions::forced())?;
        session.document_open = true;
        session.engine.save_pdf(output)
    }
}

/// Closes the document and releases the engine when dropped.
struct EngineSession<'a, E: RenderEngine> {
    engine: &'a mut E,
    document_open: bool,
}

impl<E: RenderEngine> Drop for EngineSession<'_, E> {
    fn drop(&mut self) {
        if self.document_open {
            self.engine.close_document();
        }
        self.engine.release();
    }
}
