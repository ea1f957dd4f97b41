//! Pathfinding job protocol: a cooperative cancellation flag and a polled
//! job handle.
//!
//! # Ownership
//!
//! The pathfinder and the engine each hold a clone of the same [`JobHandle`].
//! The pathfinder advances it (`start`, `pause`, `finish`, ...); the engine
//! only polls [`JobHandle::status`] and reads the outcome once the status is
//! [`JobStatus::Finished`].  It never blocks on a job.
//!
//! Cancellation is the reverse direction: the engine keeps the
//! [`CancelToken`] and the job is expected to check it between slices of
//! work, finishing with [`PathError::Cancelled`] once it notices.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use st_core::{PathError, TileCoord};

/// Ordered waypoints from (near) the start tile to (near) the end tile.
pub type Route = Vec<TileCoord>;

// ── CancelToken ───────────────────────────────────────────────────────────────

/// Shared cancellation flag.  Cloning shares the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.  Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

// ── JobStatus ─────────────────────────────────────────────────────────────────

/// Scheduling state of a job as seen by the pathfinder's job queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued, not started.
    Pending,
    Running,
    /// Time slice used up; will resume later.
    Paused,
    /// Blocked on some external resource.
    Waiting,
    /// Outcome available.
    Finished,
}

impl JobStatus {
    /// `true` while cancelling still has an effect.
    #[inline]
    pub fn is_live(self) -> bool {
        !matches!(self, JobStatus::Finished)
    }
}

// ── JobHandle ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct JobState {
    status:  JobStatus,
    outcome: Option<Result<Route, PathError>>,
}

/// Shared handle to one asynchronous pathfinding job.
#[derive(Clone, Debug)]
pub struct JobHandle {
    state: Arc<Mutex<JobState>>,
}

impl Default for JobHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl JobHandle {
    /// A new job in [`JobStatus::Pending`].
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(JobState { status: JobStatus::Pending, outcome: None })),
        }
    }

    /// A job that is already finished with `outcome`.  Handy for synchronous
    /// pathfinders.
    pub fn finished(outcome: Result<Route, PathError>) -> Self {
        let handle = Self::new();
        handle.finish(outcome);
        handle
    }

    // A panic while holding the lock leaves plain data behind; keep using it.
    fn lock(&self) -> MutexGuard<'_, JobState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ── Polling side (engine) ─────────────────────────────────────────────

    pub fn status(&self) -> JobStatus {
        self.lock().status
    }

    /// The fault the job finished with, if any.  Does not consume the outcome.
    pub fn fault(&self) -> Option<PathError> {
        match &self.lock().outcome {
            Some(Err(e)) => Some(e.clone()),
            _ => None,
        }
    }

    /// Move the outcome out of a finished job.  Returns `None` if the job is
    /// not finished or the outcome was already taken.
    pub fn take_outcome(&self) -> Option<Result<Route, PathError>> {
        let mut state = self.lock();
        if state.status != JobStatus::Finished {
            return None;
        }
        state.outcome.take()
    }

    // ── Driving side (pathfinder) ─────────────────────────────────────────

    pub fn set_status(&self, status: JobStatus) {
        self.lock().status = status;
    }

    /// Store the outcome and mark the job finished.
    pub fn finish(&self, outcome: Result<Route, PathError>) {
        let mut state = self.lock();
        state.status = JobStatus::Finished;
        state.outcome = Some(outcome);
    }
}
