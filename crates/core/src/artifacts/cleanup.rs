//! Idempotent artifact deletion.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::metrics::CLEANUP_FAILURES;

/// What a cleanup pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files deleted by this pass.
    pub removed: usize,
    /// Files that were already gone.
    pub missing: usize,
    /// Files that could not be deleted.
    pub failed: usize,
}

impl CleanupReport {
    fn record(&mut self, path: &Path, result: io::Result<()>) {
        match result {
            Ok(()) => {
                debug!(path = %path.display(), "Removed artifact");
                self.removed += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.missing += 1,
            Err(e) => {
                CLEANUP_FAILURES.inc();
                warn!(path = %path.display(), "Failed to remove artifact: {}", e);
                self.failed += 1;
            }
        }
    }
}

/// Deletes every path that exists. Missing paths are skipped and individual
/// failures are logged without aborting the pass, so calling this twice with
/// the same paths is harmless.
pub async fn cleanup<I, P>(paths: I) -> CleanupReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut report = CleanupReport::default();
    for path in paths {
        let path = path.as_ref();
        report.record(path, tokio::fs::remove_file(path).await);
    }
    report
}

/// Blocking variant of [`cleanup`] for contexts without a runtime.
pub fn cleanup_blocking<I, P>(paths: I) -> CleanupReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut report = CleanupReport::default();
    for path in paths {
        let path = path.as_ref();
        report.record(path, std::fs::remove_file(path));
    }
    report
}

/// Deletes its paths when dropped.
///
/// The response body holds one of these so that the input and output of a
/// request are removed once the PDF has been streamed, or when the client
/// disconnects halfway through.
#[derive(Debug, Default)]
pub struct CleanupGuard {
    paths: Vec<PathBuf>,
}

impl CleanupGuard {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Adds another path to delete.
    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Gives the paths back without deleting them.
    pub fn disarm(mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.paths)
    }

    /// Deletes the paths now and waits for completion.
    pub async fn run(mut self) -> CleanupReport {
        cleanup(std::mem::take(&mut self.paths)).await
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if self.paths.is_empty() {
            return;
        }
        let paths = std::mem::take(&mut self.paths);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    cleanup(paths).await;
                });
            }
            Err(_) => {
                cleanup_blocking(paths);
            }
        }
    }
}
