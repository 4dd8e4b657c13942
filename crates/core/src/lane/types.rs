//! Types for the execution lane.

use serde::Serialize;

/// Snapshot of the lane's queue and counters.
#[derive(Debug, Clone, Serialize)]
pub struct LaneStatus {
    /// Lane name.
    pub name: String,
    /// Whether the worker still accepts jobs.
    pub running: bool,
    /// Jobs currently executing (0 or 1).
    pub active_jobs: usize,
    /// Jobs waiting in the queue.
    pub queued_jobs: usize,
    /// Queue capacity.
    pub capacity: usize,
    /// Jobs that ran to completion.
    pub total_completed: u64,
    /// Jobs dropped because their caller went away before they started.
    pub total_skipped: u64,
    /// Jobs that panicked on the worker.
    pub total_panicked: u64,
}
