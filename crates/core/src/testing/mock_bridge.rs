//! Mock format bridge for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::bridge::{BridgeError, FormatBridge};

use super::fixtures::HWPX_BYTES;

/// Outcome of one mocked bridge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// Writes an HWPX document to the output path.
    Succeed,
    /// The bridge ran and rejected the document.
    Fail,
    /// The bridge toolchain is not installed.
    Misconfigured,
}

/// A recorded bridge call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBridge {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Mock implementation of the [`FormatBridge`] trait.
#[derive(Debug, Clone)]
pub struct MockBridge {
    calls: Arc<RwLock<Vec<RecordedBridge>>>,
    outcome: Arc<RwLock<BridgeOutcome>>,
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBridge {
    /// Create a bridge that succeeds.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            outcome: Arc::new(RwLock::new(BridgeOutcome::Succeed)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Set the outcome of every following call.
    pub async fn set_outcome(&self, outcome: BridgeOutcome) {
        *self.outcome.write().await = outcome;
    }

    /// Keep a successful call running for `delay` after its output is
    /// written.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedBridge> {
        self.calls.read().await.clone()
    }

    /// Get the number of bridge calls.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    fn error_for(outcome: BridgeOutcome, output: &Path) -> Option<BridgeError> {
        match outcome {
            BridgeOutcome::Succeed => None,
            BridgeOutcome::Fail => Some(BridgeError::ExitStatus {
                code: Some(1),
                stderr: Some(format!("cannot convert to {}", output.display())),
            }),
            BridgeOutcome::Misconfigured => Some(BridgeError::ArtifactMissing {
                path: PathBuf::from("hwp2hwpx/target/hwp2hwpx-1.0.0.jar"),
            }),
        }
    }
}

#[async_trait]
impl FormatBridge for MockBridge {
    fn name(&self) -> &str {
        "mock"
    }

    async fn bridge(&self, input: &Path, output: &Path) -> Result<(), BridgeError> {
        self.calls.write().await.push(RecordedBridge {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });

        let outcome = *self.outcome.read().await;
        match Self::error_for(outcome, output) {
            Some(err) => Err(err),
            None => {
                tokio::fs::write(output, HWPX_BYTES).await?;
                let delay = *self.delay.read().await;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(())
            }
        }
    }

    async fn validate(&self) -> Result<(), BridgeError> {
        match Self::error_for(*self.outcome.read().await, Path::new("")) {
            Some(err) if err.is_configuration() => Err(err),
            _ => Ok(()),
        }
    }
}
