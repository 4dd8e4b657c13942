//! Java-based HWP to HWPX bridge.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use super::config::BridgeConfig;
use super::error::BridgeError;
use super::traits::FormatBridge;

/// Runs the `hwp2hwpx` converter in a separate JVM per document.
pub struct JavaBridge {
    config: BridgeConfig,
}

/// Resolved on-disk layout of a bridge installation.
#[derive(Debug)]
struct BridgeLayout {
    root: PathBuf,
    artifact: PathBuf,
    lib_dir: PathBuf,
    dependencies: Vec<PathBuf>,
}

impl BridgeLayout {
    fn classpath(&self) -> Result<OsString, BridgeError> {
        let entries = std::iter::once(&self.artifact).chain(self.dependencies.iter());
        std::env::join_paths(entries).map_err(|e| BridgeError::LaunchFailed {
            program: self.artifact.clone(),
            reason: format!("invalid classpath entry: {}", e),
        })
    }
}

impl JavaBridge {
    /// Creates a bridge with the given configuration.
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Creates a bridge with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(BridgeConfig::default())
    }

    /// Checks the installation on disk, failing fast on the first missing
    /// piece.
    async fn resolve_layout(&self) -> Result<BridgeLayout, BridgeError> {
        let root = std::path::absolute(&self.config.install_dir)?;
        if !tokio::fs::metadata(&root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(BridgeError::InstallDirMissing { path: root });
        }

        let artifact = root.join(&self.config.artifact);
        if !tokio::fs::try_exists(&artifact).await.unwrap_or(false) {
            return Err(BridgeError::ArtifactMissing { path: artifact });
        }

        let lib_dir = root.join(&self.config.lib_dir);
        let mut dependencies = Vec::new();
        if let Ok(mut entries) = tokio::fs::read_dir(&lib_dir).await {
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "jar") {
                    dependencies.push(path);
                }
            }
        }
        if dependencies.is_empty() {
            return Err(BridgeError::DependenciesMissing { path: lib_dir });
        }
        dependencies.sort();

        Ok(BridgeLayout {
            root,
            artifact,
            lib_dir,
            dependencies,
        })
    }

    fn build_args(
        &self,
        layout: &BridgeLayout,
        input: &Path,
        output: &Path,
    ) -> Result<Vec<OsString>, BridgeError> {
        let mut library_path = OsString::from("-Djava.library.path=");
        library_path.push(&layout.lib_dir);

        Ok(vec![
            library_path,
            OsString::from("-cp"),
            layout.classpath()?,
            OsString::from(&self.config.entry_point),
            input.as_os_str().to_os_string(),
            output.as_os_str().to_os_string(),
        ])
    }
}

#[async_trait]
impl FormatBridge for JavaBridge {
    fn name(&self) -> &str {
        "hwp2hwpx"
    }

    async fn bridge(&self, input: &Path, output: &Path) -> Result<(), BridgeError> {
        let start = Instant::now();
        let layout = self.resolve_layout().await?;

        // The bridge runs from its own root, so hand it absolute paths.
        let input = std::path::absolute(input)?;
        let output = std::path::absolute(output)?;
        let args = self.build_args(&layout, &input, &output)?;

        debug!(
            java = %self.config.java_path.display(),
            cwd = %layout.root.display(),
            ?args,
            "Launching format bridge"
        );

        let child = Command::new(&self.config.java_path)
            .args(&args)
            .current_dir(&layout.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BridgeError::LaunchFailed {
                program: self.config.java_path.clone(),
                reason: e.to_string(),
            })?;

        // Dropping the child on timeout kills it.
        let result = timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await;

        let output_capture = match result {
            Ok(Ok(capture)) => capture,
            Ok(Err(e)) => return Err(BridgeError::Io(e)),
            Err(_) => {
                return Err(BridgeError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output_capture.stdout);
        let stderr = String::from_utf8_lossy(&output_capture.stderr);
        if !stdout.trim().is_empty() {
            debug!(stdout = %stdout.trim(), "Bridge output");
        }

        if !output_capture.status.success() {
            return Err(BridgeError::ExitStatus {
                code: output_capture.status.code(),
                stderr: if stderr.trim().is_empty() {
                    None
                } else {
                    Some(stderr.into_owned())
                },
            });
        }

        if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
            return Err(BridgeError::OutputMissing { path: output });
        }

        info!(
            input = %input.display(),
            output = %output.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Bridged document to HWPX"
        );
        Ok(())
    }

    async fn validate(&self) -> Result<(), BridgeError> {
        let layout = self.resolve_layout().await?;

        let probe = Command::new(&self.config.java_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match probe {
            Ok(_) => {
                debug!(
                    root = %layout.root.display(),
                    dependencies = layout.dependencies.len(),
                    "Format bridge installation looks complete"
                );
                Ok(())
            }
            Err(e) => Err(BridgeError::LaunchFailed {
                program: self.config.java_path.clone(),
                reason: e.to_string(),
            }),
        }
    }
}
