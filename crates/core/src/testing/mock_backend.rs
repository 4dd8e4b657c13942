//! Mock PDF backend for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::backend::PdfBackend;
use crate::document::SourceFormat;

use super::fixtures::PDF_BYTES;

/// Outcome of one mocked conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendOutcome {
    /// Writes a PDF and reports `true`.
    Succeed,
    /// Reports `false`.
    Fail,
    /// Reports `true` without writing anything.
    ClaimWithoutOutput,
}

/// A recorded conversion for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedConversion {
    pub input: PathBuf,
    pub output: PathBuf,
    /// What the backend reported.
    pub reported: bool,
}

/// Mock implementation of the [`PdfBackend`] trait.
///
/// Outcomes are resolved in this order: queued outcomes (one per call), the
/// outcome configured for the input's format, then the default.
///
/// # Example
///
/// ```rust,ignore
/// use hwpdf_core::testing::{BackendOutcome, ScriptedBackend};
///
/// let backend = ScriptedBackend::new();
/// backend.set_format_outcome(SourceFormat::Hwp, BackendOutcome::Fail).await;
///
/// // Direct HWP attempt fails, the HWPX retry succeeds.
/// let outcome = orchestrator.run(&request).await;
/// assert_eq!(backend.conversion_count().await, 2);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    queued: Arc<RwLock<VecDeque<BackendOutcome>>>,
    by_format: Arc<RwLock<HashMap<SourceFormat, BackendOutcome>>>,
    default: Arc<RwLock<BackendOutcome>>,
    delay: Arc<RwLock<Duration>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Create a backend that succeeds on everything.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            queued: Arc::new(RwLock::new(VecDeque::new())),
            by_format: Arc::new(RwLock::new(HashMap::new())),
            default: Arc::new(RwLock::new(BackendOutcome::Succeed)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Queue an outcome for the next call.
    pub async fn push_outcome(&self, outcome: BackendOutcome) {
        self.queued.write().await.push_back(outcome);
    }

    /// Set the outcome for inputs of one format.
    pub async fn set_format_outcome(&self, format: SourceFormat, outcome: BackendOutcome) {
        self.by_format.write().await.insert(format, outcome);
    }

    /// Set the outcome used when nothing more specific applies.
    pub async fn set_default(&self, outcome: BackendOutcome) {
        *self.default.write().await = outcome;
    }

    /// Set the simulated conversion duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    async fn next_outcome(&self, input: &Path) -> BackendOutcome {
        if let Some(outcome) = self.queued.write().await.pop_front() {
            return outcome;
        }
        if let Some(format) = SourceFormat::from_path(input) {
            if let Some(outcome) = self.by_format.read().await.get(&format) {
                return *outcome;
            }
        }
        *self.default.read().await
    }
}

#[async_trait]
impl PdfBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn convert(&self, input: &Path, output: &Path) -> bool {
        let outcome = self.next_outcome(input).await;

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reported = match outcome {
            BackendOutcome::Succeed => tokio::fs::write(output, PDF_BYTES).await.is_ok(),
            BackendOutcome::Fail => false,
            BackendOutcome::ClaimWithoutOutput => true,
        };

        self.conversions.write().await.push(RecordedConversion {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            reported,
        });
        reported
    }
}
