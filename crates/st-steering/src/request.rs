//! Path job submission and polling.
//!
//! An agent has at most one outstanding job.  Submitting while one is
//! outstanding is a no-op; the job is dropped from the agent once its
//! outcome has been consumed or it is cancelled on unregister.

use st_core::{EntityId, GridId, PathError, Vec2};
use st_world::{CancelToken, JobHandle, JobStatus, PathRequest, Pathfinder, Route, World};
use tracing::debug;

/// An outstanding job and the token that cancels it.
#[derive(Clone, Debug)]
pub struct PathJob {
    pub token:  CancelToken,
    pub handle: JobHandle,
}

/// What a poll of a [`PathJob`] found.
#[derive(Debug, PartialEq)]
pub enum JobPoll {
    /// Still pending, running, paused, or waiting.
    Outstanding,
    Route(Route),
    Cancelled,
    Fault(PathError),
}

impl PathJob {
    /// Consume the job's outcome if it has finished.  A finished job with
    /// no outcome left reads as an empty route.
    pub fn poll(&self) -> JobPoll {
        if self.handle.status().is_live() {
            return JobPoll::Outstanding;
        }
        match self.handle.take_outcome() {
            None => JobPoll::Route(Route::new()),
            Some(Ok(route)) => JobPoll::Route(route),
            Some(Err(e)) if e.is_cancellation() => JobPoll::Cancelled,
            Some(Err(e)) => JobPoll::Fault(e),
        }
    }

    /// Cancel a job that has not finished yet.  A job that already finished
    /// with a genuine fault reports it, since nobody else will.
    pub fn cancel(&self) -> Result<(), PathError> {
        match self.handle.status() {
            JobStatus::Finished => match self.handle.fault() {
                Some(e) if !e.is_cancellation() => Err(e),
                _ => Ok(()),
            },
            _ => {
                self.token.cancel();
                Ok(())
            }
        }
    }
}

/// Submit a route request from `from` to `to` for `entity`.
pub fn submit<W, P>(
    world:      &W,
    pathfinder: &mut P,
    entity:     EntityId,
    grid:       GridId,
    from:       Vec2,
    to:         Vec2,
    proximity:  f32,
) -> PathJob
where
    W: World + ?Sized,
    P: Pathfinder + ?Sized,
{
    let request = PathRequest {
        entity,
        access:         world.access_tags(entity),
        collision_mask: world.collision_mask(entity).unwrap_or(0),
        grid,
        start:          world.tile_at(grid, from),
        end:            world.tile_at(grid, to),
        proximity,
    };
    debug!(
        entity = %entity,
        start = %request.start,
        end = %request.end,
        "requesting path",
    );
    let token = CancelToken::new();
    let handle = pathfinder.submit(request, token.clone());
    PathJob { token, handle }
}
