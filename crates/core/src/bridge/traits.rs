//! Trait definitions for the format bridge.

use async_trait::async_trait;
use std::path::Path;

use super::error::BridgeError;

/// Re-encodes an HWP document as HWPX out-of-process.
#[async_trait]
pub trait FormatBridge: Send + Sync {
    /// Returns the name of this bridge implementation.
    fn name(&self) -> &str;

    /// Converts the HWP document at `input` to an HWPX document at `output`.
    async fn bridge(&self, input: &Path, output: &Path) -> Result<(), BridgeError>;

    /// Checks that the bridge is installed and runnable.
    async fn validate(&self) -> Result<(), BridgeError>;
}
