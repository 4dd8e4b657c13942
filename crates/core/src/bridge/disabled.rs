//! Bridge used when bridging is turned off.

use async_trait::async_trait;
use std::path::Path;

use super::error::BridgeError;
use super::traits::FormatBridge;

/// A bridge that always reports [`BridgeError::Disabled`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledBridge;

#[async_trait]
impl FormatBridge for DisabledBridge {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn bridge(&self, _input: &Path, _output: &Path) -> Result<(), BridgeError> {
        Err(BridgeError::Disabled)
    }

    async fn validate(&self) -> Result<(), BridgeError> {
        Err(BridgeError::Disabled)
    }
}
