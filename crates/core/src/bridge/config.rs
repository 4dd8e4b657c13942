//! Configuration for the format bridge.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the out-of-process HWP to HWPX bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Whether the bridge step is attempted at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Installation root. The bridge runs with this as working directory.
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,

    /// Java launcher.
    #[serde(default = "default_java_path")]
    pub java_path: PathBuf,

    /// Fully qualified main class.
    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    /// Packaged bridge artifact, relative to `install_dir`.
    #[serde(default = "default_artifact")]
    pub artifact: PathBuf,

    /// Runtime dependency directory, relative to `install_dir`. Also used as
    /// the native library search path.
    #[serde(default = "default_lib_dir")]
    pub lib_dir: PathBuf,

    /// Hard deadline for one bridge run in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_install_dir() -> PathBuf {
    PathBuf::from("hwp2hwpx")
}

fn default_java_path() -> PathBuf {
    PathBuf::from("java")
}

fn default_entry_point() -> String {
    "kr.dogfoot.hwp2hwpx.ConvertExample".to_string()
}

fn default_artifact() -> PathBuf {
    PathBuf::from("target/hwp2hwpx-1.0.0.jar")
}

fn default_lib_dir() -> PathBuf {
    PathBuf::from("lib")
}

fn default_timeout() -> u64 {
    120
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            install_dir: default_install_dir(),
            java_path: default_java_path(),
            entry_point: default_entry_point(),
            artifact: default_artifact(),
            lib_dir: default_lib_dir(),
            timeout_secs: default_timeout(),
        }
    }
}

impl BridgeConfig {
    /// Creates a config rooted at `install_dir`.
    pub fn with_install_dir(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            ..Default::default()
        }
    }

    /// Sets the java launcher.
    pub fn with_java(mut self, java_path: impl Into<PathBuf>) -> Self {
        self.java_path = java_path.into();
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
