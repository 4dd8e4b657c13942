//! [`PdfBackend`] that funnels every conversion through the execution lane.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

use super::adapter::BackendAdapter;
use super::traits::{PdfBackend, RenderEngine};
use crate::artifacts::cleanup_blocking;
use crate::lane::{ExecutionLane, LaneStatus};

/// Submits adapter conversions to a shared [`ExecutionLane`].
pub struct LaneBackend<E: RenderEngine> {
    lane: Arc<ExecutionLane<BackendAdapter<E>>>,
}

impl<E: RenderEngine> LaneBackend<E> {
    /// Creates a backend submitting to `lane`.
    pub fn new(lane: Arc<ExecutionLane<BackendAdapter<E>>>) -> Self {
        Self { lane }
    }

    /// Returns the lane status.
    pub fn lane_status(&self) -> LaneStatus {
        self.lane.status()
    }
}

#[async_trait]
impl<E: RenderEngine> PdfBackend for LaneBackend<E> {
    fn name(&self) -> &str {
        "lane"
    }

    async fn convert(&self, input: &Path, output: &Path) -> bool {
        let input = input.to_path_buf();
        let output = output.to_path_buf();

        // A started job outlives a dropped caller; it then removes what it
        // wrote, since the caller's cleanup may already have run.
        let abandoned = AbandonOnDrop::new();
        let flag = abandoned.flag();

        let result = self
            .lane
            .submit(move |adapter: &mut BackendAdapter<E>| {
                let converted = adapter.convert(&input, &output);
                if flag.load(Ordering::SeqCst) {
                    debug!(output = %output.display(), "Discarding output of abandoned conversion");
                    cleanup_blocking([&output]);
                }
                converted
            })
            .await;
        abandoned.disarm();

        match result {
            Ok(converted) => converted,
            Err(e) => {
                error!("Backend lane rejected conversion: {}", e);
                false
            }
        }
    }
}

/// Raises a shared flag when dropped while armed.
struct AbandonOnDrop {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl AbandonOnDrop {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            armed: true,
        }
    }

    fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}
