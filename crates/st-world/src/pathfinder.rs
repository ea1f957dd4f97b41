//! Pathfinder trait and a time-sliced job queue implementing it.
//!
//! # Pluggability
//!
//! The engine submits work through the [`Pathfinder`] trait and gets a
//! [`JobHandle`] back immediately.  How and when the job runs is up to the
//! implementation: a worker thread, a per-frame CPU budget, or synchronously
//! inside `submit`.
//!
//! [`QueuedPathfinder`] is the per-frame-budget variant.  It owns the queue
//! and the cancellation bookkeeping but not the search itself; the caller
//! passes the search as a closure to [`QueuedPathfinder::pump`].

use std::collections::VecDeque;

use st_core::{EntityId, GridId, PathError, TileCoord};
use tracing::debug;

use crate::{CancelToken, JobHandle, JobStatus, Route};

// ── PathRequest ───────────────────────────────────────────────────────────────

/// Everything the external search needs to plan one route.
#[derive(Clone, Debug, PartialEq)]
pub struct PathRequest {
    pub entity:         EntityId,
    /// Access credentials of the mover (door access and the like).
    pub access:         Vec<String>,
    pub collision_mask: u32,
    pub grid:           GridId,
    pub start:          TileCoord,
    pub end:            TileCoord,
    /// How close a reachable tile must be to `end` to count as the goal.
    pub proximity:      f32,
}

// ── Pathfinder trait ──────────────────────────────────────────────────────────

/// Asynchronous route planner.
pub trait Pathfinder {
    /// Queue `request`.  The job must observe `cancel` and finish with
    /// [`PathError::Cancelled`] once it is set.
    fn submit(&mut self, request: PathRequest, cancel: CancelToken) -> JobHandle;
}

// ── QueuedPathfinder ──────────────────────────────────────────────────────────

struct QueuedJob {
    request: PathRequest,
    cancel:  CancelToken,
    handle:  JobHandle,
}

/// FIFO job queue drained a few jobs at a time.
///
/// ```rust
/// use st_core::{EntityId, GridId, TileCoord};
/// use st_world::{CancelToken, JobStatus, PathRequest, Pathfinder, QueuedPathfinder};
///
/// let mut pf = QueuedPathfinder::new();
/// let request = PathRequest {
///     entity: EntityId(1), access: vec![], collision_mask: 1, grid: GridId(0),
///     start: TileCoord::new(0, 0), end: TileCoord::new(2, 0), proximity: 0.0,
/// };
/// let job = pf.submit(request, CancelToken::new());
/// assert_eq!(job.status(), JobStatus::Pending);
///
/// pf.pump(8, |req| Ok(vec![req.start, req.end]));
/// assert_eq!(job.status(), JobStatus::Finished);
/// ```
#[derive(Default)]
pub struct QueuedPathfinder {
    queue:     VecDeque<QueuedJob>,
    submitted: usize,
}

impl QueuedPathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of jobs ever submitted.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Jobs waiting to run.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Requests still waiting, oldest first.
    pub fn queued_requests(&self) -> impl Iterator<Item = &PathRequest> + '_ {
        self.queue.iter().map(|job| &job.request)
    }

    /// Run up to `budget` queued jobs through `search`, oldest first.
    ///
    /// Jobs whose token was cancelled while queued finish with
    /// [`PathError::Cancelled`] without calling `search` and do not count
    /// against the budget.  Returns the number of searches run.
    pub fn pump<F>(&mut self, budget: usize, mut search: F) -> usize
    where
        F: FnMut(&PathRequest) -> Result<Route, PathError>,
    {
        let mut ran = 0;
        while ran < budget {
            let Some(job) = self.queue.pop_front() else { break };

            if job.cancel.is_cancelled() {
                debug!(entity = %job.request.entity, "path job cancelled before running");
                job.handle.finish(Err(PathError::Cancelled));
                continue;
            }

            job.handle.set_status(JobStatus::Running);
            let outcome = search(&job.request);

            // The search may have been slow; a late cancel still wins.
            let outcome = if job.cancel.is_cancelled() { Err(PathError::Cancelled) } else { outcome };
            debug!(
                entity = %job.request.entity,
                ok = outcome.is_ok(),
                "path job finished",
            );
            job.handle.finish(outcome);
            ran += 1;
        }
        ran
    }
}

impl Pathfinder for QueuedPathfinder {
    fn submit(&mut self, request: PathRequest, cancel: CancelToken) -> JobHandle {
        let handle = JobHandle::new();
        self.queue.push_back(QueuedJob { request, cancel, handle: handle.clone() });
        self.submitted += 1;
        handle
    }
}
