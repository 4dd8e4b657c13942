//! Configuration for the backend module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the command-line rendering engine.
///
/// `args` is a template; these placeholders are substituted per call:
/// `{input}`, `{output}`, `{outdir}`, `{profile}`, `{filter}`,
/// `{open_options}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Engine program.
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Argument template.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Hard deadline for one engine run in seconds. The engine process is
    /// killed when it is exceeded.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_program() -> PathBuf {
    PathBuf::from("soffice")
}

fn default_args() -> Vec<String> {
    [
        "--headless",
        "--norestore",
        "--nolockcheck",
        "-env:UserInstallation=file://{profile}",
        "--convert-to",
        "pdf",
        "--outdir",
        "{outdir}",
        "{input}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_timeout() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            timeout_secs: default_timeout(),
        }
    }
}

impl BackendConfig {
    /// Creates a config running `program` with the given argument template.
    pub fn with_command(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
