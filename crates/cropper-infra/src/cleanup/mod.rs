//! Periodic artifact purge
//!
//! [`CleanupService`] deletes every stored artifact once per interval. The
//! first pass runs one interval after [`CleanupService::start`]. Passes never
//! overlap: the timer loop awaits each pass, and scheduled and on-demand
//! passes share a lock. A tick that fires late is not skipped.

use chrono::{DateTime, Utc};
use cropper_core::AppError;
use cropper_storage::{ArtifactStore, PurgeReport};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const NOT_SCHEDULED: i64 = i64::MIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupState {
    Idle,
    Running,
}

/// Snapshot of the purge schedule.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupSchedule {
    pub interval_secs: u64,
    /// `None` before `start` and after shutdown.
    pub next_due: Option<DateTime<Utc>>,
    pub state: CleanupState,
}

pub struct CleanupService {
    store: Arc<dyn ArtifactStore>,
    interval: Duration,
    pass_lock: Mutex<()>,
    running: AtomicBool,
    next_due_ms: AtomicI64,
}

impl CleanupService {
    pub fn new(store: Arc<dyn ArtifactStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            pass_lock: Mutex::new(()),
            running: AtomicBool::new(false),
            next_due_ms: AtomicI64::new(NOT_SCHEDULED),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> CleanupState {
        if self.running.load(Ordering::Acquire) {
            CleanupState::Running
        } else {
            CleanupState::Idle
        }
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        match self.next_due_ms.load(Ordering::Acquire) {
            NOT_SCHEDULED => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    pub fn schedule(&self) -> CleanupSchedule {
        CleanupSchedule {
            interval_secs: self.interval.as_secs(),
            next_due: self.next_due(),
            state: self.state(),
        }
    }

    fn record_next_due(&self, due: Instant) {
        let remaining = due.saturating_duration_since(Instant::now());
        let at = chrono::Duration::from_std(remaining)
            .ok()
            .and_then(|remaining| Utc::now().checked_add_signed(remaining));

        let ms = at.map(|at| at.timestamp_millis()).unwrap_or(NOT_SCHEDULED);
        self.next_due_ms.store(ms, Ordering::Release);
    }

    /// Start the background purge loop.
    ///
    /// Dropping the returned handle without calling `shutdown` also stops the
    /// loop once the current pass, if any, has finished.
    pub fn start(self: Arc<Self>) -> CleanupHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let period = self.interval;
        let mut due = Instant::now() + period;
        self.record_next_due(due);

        tracing::info!(interval_secs = period.as_secs(), "Cleanup scheduler started");

        let join = tokio::spawn(async move {
            let mut ticker = interval_at(due, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        due += period;
                        self.record_next_due(due);
                        // Errors are logged inside; the loop keeps running.
                        let _ = self.run_once().await;
                    }
                }
            }

            self.next_due_ms.store(NOT_SCHEDULED, Ordering::Release);
            tracing::info!("Cleanup scheduler stopped");
        });

        CleanupHandle { shutdown_tx, join }
    }

    /// Run one purge pass now, waiting for any pass already in flight.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "purge_all"))]
    pub async fn run_once(&self) -> Result<PurgeReport, AppError> {
        let _guard = self.pass_lock.lock().await;
        let running = RunningFlag::set(&self.running);
        let start = std::time::Instant::now();

        tracing::info!("Starting scheduled purge of stored artifacts");
        let result = self.store.purge_all().await;
        drop(running);

        match result {
            Ok(report) => {
                for failure in &report.failures {
                    tracing::warn!(
                        name = %failure.name,
                        error = %failure.error,
                        "Failed to delete artifact during purge"
                    );
                }

                tracing::info!(
                    deleted = report.deleted,
                    failed = report.failed(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Purge completed"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Purge pass failed");
                Err(AppError::CleanupPass(e.to_string()))
            }
        }
    }
}

/// Marks a pass as running until dropped, including when the pass future is
/// cancelled.
struct RunningFlag<'a>(&'a AtomicBool);

impl<'a> RunningFlag<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        RunningFlag(flag)
    }
}

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to a running purge loop.
pub struct CleanupHandle {
    shutdown_tx: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl CleanupHandle {
    /// Stop the timer and wait for an in-flight pass to finish.
    pub async fn shutdown(self) {
        tracing::info!("Initiating cleanup scheduler shutdown");
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "Cleanup scheduler task failed");
        }
    }
}
