//! Upload-to-PDF flow used by the HTTP layer.

mod error;

pub use error::ConvertError;

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::artifacts::{ArtifactStore, CleanupGuard};
use crate::backend::PdfBackend;
use crate::bridge::FormatBridge;
use crate::document::{pdf_download_name, SourceFormat};
use crate::orchestrator::{ConversionRequest, FailureCause, Orchestrator, Strategy};

/// A verified PDF ready to be streamed.
///
/// Dropping `cleanup` deletes the PDF together with every other artifact of
/// the request, so it must live until the response body is finished.
#[derive(Debug)]
pub struct ConvertedDocument {
    pub request_id: String,
    /// `<original stem>.pdf`.
    pub download_name: String,
    pub pdf_path: PathBuf,
    pub size_bytes: u64,
    pub strategy: Strategy,
    pub cleanup: CleanupGuard,
}

/// Validates, stores and converts uploads.
pub struct ConversionService {
    store: ArtifactStore,
    orchestrator: Orchestrator,
}

impl ConversionService {
    pub fn new(
        store: ArtifactStore,
        backend: Arc<dyn PdfBackend>,
        bridge: Arc<dyn FormatBridge>,
    ) -> Self {
        let orchestrator = Orchestrator::new(backend, bridge, store.clone());
        Self {
            store,
            orchestrator,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Converts one upload.
    ///
    /// Unsupported names are rejected before anything is written. On every
    /// error path the request's artifacts are deleted before returning.
    pub async fn convert_upload(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ConvertedDocument, ConvertError> {
        let format =
            SourceFormat::from_filename(filename).ok_or_else(|| ConvertError::InvalidInput {
                filename: filename.to_string(),
            })?;

        let request_id = Uuid::new_v4().to_string();
        let request = ConversionRequest::new(
            request_id.clone(),
            self.store.input_path(&request_id, format),
            self.store.output_path(&request_id),
            format,
        );

        // Armed before anything is written, so a dropped request still
        // removes its files.
        let mut guard = CleanupGuard::new(request.owned_paths());

        if let Err(e) = self
            .store
            .persist_upload(&request.input_path, bytes)
            .await
        {
            error!(request_id = %request_id, "Failed to store upload: {}", e);
            guard.run().await;
            return Err(ConvertError::StorageFailure(e));
        }

        info!(
            request_id = %request_id,
            filename,
            format = %format,
            size = bytes.len(),
            "Converting upload"
        );

        let outcome = self.orchestrator.run_guarded(&request, &mut guard).await;

        let strategy = match (outcome.succeeded, outcome.strategy) {
            (true, Some(strategy)) => strategy,
            _ => {
                guard.run().await;
                return Err(match outcome.failure {
                    Some(FailureCause::BridgeUnavailable) => {
                        ConvertError::BridgeConfiguration { request_id }
                    }
                    _ => ConvertError::ConversionFailure { request_id },
                });
            }
        };

        let size_bytes = match tokio::fs::metadata(&request.output_path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                guard.run().await;
                return Err(ConvertError::StorageFailure(e));
            }
        };

        Ok(ConvertedDocument {
            request_id,
            download_name: pdf_download_name(filename),
            pdf_path: request.output_path,
            size_bytes,
            strategy,
            cleanup: guard,
        })
    }
}
