//! Tick event hooks.
//!
//! Implement [`SteeringObserver`] to collect statistics or traces without
//! touching the engine.  All methods have no-op defaults.

use st_core::EntityId;

use crate::{SteeringStatus, TickSummary};

pub trait SteeringObserver {
    /// Called before any agent in `bucket` is evaluated.
    fn on_tick_start(&mut self, _bucket: usize) {}

    /// Called after each agent evaluation.
    fn on_status(&mut self, _entity: EntityId, _status: SteeringStatus) {}

    /// Called when a route request is handed to the pathfinder.
    fn on_path_requested(&mut self, _entity: EntityId) {}

    /// Called when an agent's route is dropped for lack of progress.
    fn on_stuck(&mut self, _entity: EntityId) {}

    /// Called once the bucket has been fully evaluated.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}
}

/// An observer that does nothing.
pub struct NoopObserver;

impl SteeringObserver for NoopObserver {}
