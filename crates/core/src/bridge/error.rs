//! Error types for the format bridge.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while bridging a document.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Bridging is turned off.
    #[error("Format bridge is disabled")]
    Disabled,

    /// The installation directory does not exist.
    #[error("Bridge installation directory not found: {path}")]
    InstallDirMissing { path: PathBuf },

    /// The packaged bridge artifact does not exist.
    #[error("Bridge artifact not found: {path}")]
    ArtifactMissing { path: PathBuf },

    /// The runtime dependency directory is missing or holds no libraries.
    #[error("Bridge dependencies not found in: {path}")]
    DependenciesMissing { path: PathBuf },

    /// The bridge process could not be started.
    #[error("Failed to launch {program}: {reason}")]
    LaunchFailed { program: PathBuf, reason: String },

    /// The bridge process exited unsuccessfully.
    #[error("Bridge exited with code: {code:?}")]
    ExitStatus {
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// The bridge reported success but wrote nothing.
    #[error("Bridge produced no output at: {path}")]
    OutputMissing { path: PathBuf },

    /// The bridge exceeded its deadline and was killed.
    #[error("Bridge timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while preparing the bridge.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether this is an installation problem an operator has to fix, as
    /// opposed to a document the bridge could not handle.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Disabled
                | Self::InstallDirMissing { .. }
                | Self::ArtifactMissing { .. }
                | Self::DependenciesMissing { .. }
                | Self::LaunchFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors() {
        assert!(BridgeError::Disabled.is_configuration());
        assert!(BridgeError::ArtifactMissing {
            path: PathBuf::from("x.jar")
        }
        .is_configuration());
        assert!(BridgeError::LaunchFailed {
            program: PathBuf::from("java"),
            reason: "not found".to_string()
        }
        .is_configuration());
    }

    #[test]
    fn test_conversion_errors() {
        assert!(!BridgeError::ExitStatus {
            code: Some(1),
            stderr: None
        }
        .is_configuration());
        assert!(!BridgeError::OutputMissing {
            path: PathBuf::from("x.hwpx")
        }
        .is_configuration());
        assert!(!BridgeError::Timeout { timeout_secs: 5 }.is_configuration());
    }
}
