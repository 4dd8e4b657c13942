//! Single-worker lane implementation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::error::LaneError;
use super::types::LaneStatus;

/// Outcome of a dequeued job, as seen by the worker.
enum JobDisposition {
    Ran,
    Skipped,
}

type Job<R> = Box<dyn FnOnce(&mut R) -> JobDisposition + Send>;

enum LaneMessage<R> {
    Run(Job<R>),
    Shutdown,
}

#[derive(Default)]
struct LaneStats {
    active: AtomicUsize,
    completed: AtomicU64,
    skipped: AtomicU64,
    panicked: AtomicU64,
}

/// A FIFO lane that owns a resource `R` on one dedicated thread.
///
/// `R` is never shared: it is moved onto the worker at spawn time and jobs
/// receive `&mut R`, so two jobs cannot observe it at the same time.
pub struct ExecutionLane<R> {
    name: String,
    tx: mpsc::Sender<LaneMessage<R>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<LaneStats>,
}

impl<R: Send + 'static> ExecutionLane<R> {
    /// Spawns the worker thread and moves `resource` onto it.
    pub fn spawn(
        name: impl Into<String>,
        resource: R,
        queue_capacity: usize,
    ) -> Result<Self, LaneError> {
        let name = name.into();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let stats = Arc::new(LaneStats::default());

        let worker_name = name.clone();
        let worker_stats = Arc::clone(&stats);
        let handle = std::thread::Builder::new()
            .name(format!("lane-{}", name))
            .spawn(move || run_worker(worker_name, resource, rx, worker_stats))?;

        info!(lane = %name, capacity = queue_capacity, "Execution lane started");

        Ok(Self {
            name,
            tx,
            worker: Mutex::new(Some(handle)),
            stats,
        })
    }

    /// Submits a job and waits for its result.
    ///
    /// Dropping the returned future before the job starts removes the job
    /// from the lane without running it. Once started, the job runs to
    /// completion even if the caller is gone.
    pub async fn submit<T, F>(&self, job: F) -> Result<T, LaneError>
    where
        F: FnOnce(&mut R) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let wrapped: Job<R> = Box::new(move |resource: &mut R| {
            if reply_tx.is_closed() {
                return JobDisposition::Skipped;
            }
            let value = job(resource);
            // The caller may have timed out while the job was running.
            let _ = reply_tx.send(value);
            JobDisposition::Ran
        });

        self.tx
            .send(LaneMessage::Run(wrapped))
            .await
            .map_err(|_| LaneError::Closed)?;

        reply_rx.await.map_err(|_| LaneError::JobAborted)
    }

    /// Returns a snapshot of the lane's counters.
    pub fn status(&self) -> LaneStatus {
        let capacity = self.tx.max_capacity();
        LaneStatus {
            name: self.name.clone(),
            running: !self.tx.is_closed(),
            active_jobs: self.stats.active.load(Ordering::Relaxed),
            queued_jobs: capacity.saturating_sub(self.tx.capacity()),
            capacity,
            total_completed: self.stats.completed.load(Ordering::Relaxed),
            total_skipped: self.stats.skipped.load(Ordering::Relaxed),
            total_panicked: self.stats.panicked.load(Ordering::Relaxed),
        }
    }

    /// Drains the jobs queued so far, then stops and joins the worker.
    ///
    /// Submissions made after this call resolve to [`LaneError::Closed`].
    pub async fn shutdown(&self) {
        if self.tx.send(LaneMessage::Shutdown).await.is_err() {
            debug!(lane = %self.name, "Lane already stopped");
        }

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if let Some(handle) = handle {
            match tokio::task::spawn_blocking(move || handle.join()).await {
                Ok(Ok(())) => info!(lane = %self.name, "Execution lane stopped"),
                Ok(Err(_)) => error!(lane = %self.name, "Lane worker terminated abnormally"),
                Err(e) => error!(lane = %self.name, "Failed to join lane worker: {}", e),
            }
        }
    }
}

fn run_worker<R>(
    name: String,
    mut resource: R,
    mut rx: mpsc::Receiver<LaneMessage<R>>,
    stats: Arc<LaneStats>,
) {
    debug!(lane = %name, "Lane worker running");

    while let Some(message) = rx.blocking_recv() {
        let job = match message {
            LaneMessage::Run(job) => job,
            LaneMessage::Shutdown => break,
        };

        stats.active.store(1, Ordering::Relaxed);
        let result = panic::catch_unwind(AssertUnwindSafe(|| job(&mut resource)));
        stats.active.store(0, Ordering::Relaxed);

        match result {
            Ok(JobDisposition::Ran) => {
                stats.completed.fetch_add(1, Ordering::Relaxed);
            }
            Ok(JobDisposition::Skipped) => {
                stats.skipped.fetch_add(1, Ordering::Relaxed);
                debug!(lane = %name, "Skipped job whose caller went away");
            }
            Err(_) => {
                stats.panicked.fetch_add(1, Ordering::Relaxed);
                error!(lane = %name, "Job panicked on lane worker; continuing with next job");
            }
        }
    }

    rx.close();
    let abandoned = std::iter::from_fn(|| rx.try_recv().ok()).count();
    if abandoned > 0 {
        warn!(lane = %name, abandoned, "Dropped jobs submitted after shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    #[tokio::test]
    async fn test_submit_returns_job_result() {
        let lane = ExecutionLane::spawn("test", 40_i32, 4).unwrap();
        let value = lane
            .submit(|counter: &mut i32| {
                *counter += 2;
                *counter
            })
            .await
            .unwrap();
        assert_eq!(value, 42);
        lane.shutdown().await;
    }

    #[tokio::test]
    async fn test_resource_state_persists_between_jobs() {
        let lane = ExecutionLane::spawn("test", Vec::<u32>::new(), 4).unwrap();
        for i in 0..3 {
            lane.submit(move |log: &mut Vec<u32>| log.push(i)).await.unwrap();
        }
        let log = lane.submit(|log: &mut Vec<u32>| log.clone()).await.unwrap();
        assert_eq!(log, vec![0, 1, 2]);
        lane.shutdown().await;
    }

    #[tokio::test]
    async fn test_jobs_run_in_submission_order() {
        let lane = Arc::new(ExecutionLane::spawn("test", Vec::<usize>::new(), 32).unwrap());

        // Hold the worker so every job below is queued before any runs.
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let blocker = {
            let lane = Arc::clone(&lane);
            tokio::spawn(async move {
                lane.submit(move |_: &mut Vec<usize>| {
                    let _ = release_rx.recv();
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let mut handles = Vec::new();
        for i in 0..10 {
            let lane = Arc::clone(&lane);
            handles.push(tokio::spawn(async move {
                lane.submit(move |order: &mut Vec<usize>| order.push(i)).await
            }));
            // Yield so each submission is enqueued before the next one starts.
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        release_tx.send(()).unwrap();
        blocker.await.unwrap().unwrap();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let order = lane.submit(|order: &mut Vec<usize>| order.clone()).await.unwrap();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
        lane.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_jobs_never_overlap() {
        let lane = Arc::new(ExecutionLane::spawn("test", (), 64).unwrap());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let lane = Arc::clone(&lane);
            let in_flight = Arc::clone(&in_flight);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                lane.submit(move |_: &mut ()| {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(5));
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                })
                .await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(lane.status().total_completed, 16);
        lane.shutdown().await;
    }

    #[tokio::test]
    async fn test_abandoned_job_is_skipped() {
        let lane = ExecutionLane::spawn("test", (), 4).unwrap();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let ran = Arc::new(AtomicBool::new(false));

        // Occupy the worker.
        let first = lane.submit(move |_: &mut ()| {
            let _ = release_rx.recv();
        });
        tokio::pin!(first);
        // Poll once so the blocking job is enqueued.
        let _ = tokio::time::timeout(Duration::from_millis(20), &mut first).await;

        // Queue a job and abandon it before the worker gets to it.
        let ran_flag = Arc::clone(&ran);
        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            lane.submit(move |_: &mut ()| ran_flag.store(true, Ordering::SeqCst)),
        )
        .await;
        assert!(abandoned.is_err());

        release_tx.send(()).unwrap();
        first.await.unwrap();

        // A later job proves the worker moved past the abandoned one.
        lane.submit(|_: &mut ()| ()).await.unwrap();

        assert!(!ran.load(Ordering::SeqCst));
        let status = lane.status();
        assert_eq!(status.total_skipped, 1);
        assert_eq!(status.total_completed, 2);
        lane.shutdown().await;
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_kill_lane() {
        let lane = ExecutionLane::spawn("test", 0_u32, 4).unwrap();

        let result = lane
            .submit(|_: &mut u32| -> u32 { panic!("engine exploded") })
            .await;
        assert!(matches!(result, Err(LaneError::JobAborted)));

        let value = lane
            .submit(|n: &mut u32| {
                *n += 1;
                *n
            })
            .await
            .unwrap();
        assert_eq!(value, 1);

        let status = lane.status();
        assert_eq!(status.total_panicked, 1);
        assert!(status.running);
        lane.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_then_rejects() {
        let lane = Arc::new(ExecutionLane::spawn("test", 0_u32, 8).unwrap());

        let pending = {
            let lane = Arc::clone(&lane);
            tokio::spawn(async move {
                lane.submit(|n: &mut u32| {
                    std::thread::sleep(Duration::from_millis(20));
                    *n += 1;
                    *n
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        lane.shutdown().await;
        assert_eq!(pending.await.unwrap().unwrap(), 1);

        let after = lane.submit(|n: &mut u32| *n).await;
        assert!(matches!(after, Err(LaneError::Closed)));
        assert!(!lane.status().running);
    }

    #[tokio::test]
    async fn test_status_reports_capacity() {
        let lane = ExecutionLane::spawn("backend", (), 16).unwrap();
        let status = lane.status();
        assert_eq!(status.name, "backend");
        assert_eq!(status.capacity, 16);
        assert_eq!(status.queued_jobs, 0);
        assert_eq!(status.active_jobs, 0);
        lane.shutdown().await;
    }
}
