//! Configuration for the execution lane.

use serde::{Deserialize, Serialize};

/// Configuration for the serialized execution lane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Number of jobs that may wait in the queue before submitters are
    /// suspended.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}
