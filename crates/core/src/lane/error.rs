//! Error types for the execution lane.

use thiserror::Error;

/// Errors returned to lane submitters.
#[derive(Debug, Error)]
pub enum LaneError {
    /// The worker is gone; the lane rejects all submissions.
    #[error("Execution lane is closed")]
    Closed,

    /// The job started but did not hand back a result (it panicked, or the
    /// lane shut down while it was queued).
    #[error("Job aborted before producing a result")]
    JobAborted,

    /// The worker thread could not be started.
    #[error("Failed to spawn lane worker: {0}")]
    SpawnFailed(#[from] std::io::Error),
}
