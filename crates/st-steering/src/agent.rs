//! What an agent was asked to do, and how its last evaluation went.

use st_core::{EntityId, GridPoint};

/// Default distance at which an agent counts as arrived.
pub const DEFAULT_ARRIVAL_DISTANCE: f32 = 0.5;

/// Default goal proximity handed to the pathfinder.
pub const DEFAULT_PATH_PROXIMITY: f32 = 0.5;

// ── Target ────────────────────────────────────────────────────────────────────

/// Where the agent is heading.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Target {
    /// A fixed point on a grid.
    Point(GridPoint),

    /// Another (possibly moving) entity.  Once the target has drifted
    /// `max_drift` away from where the current route was planned to, a new
    /// route is requested.
    Entity { entity: EntityId, max_drift: f32 },
}

impl Target {
    /// The target entity, if this target follows one.
    pub fn entity(&self) -> Option<EntityId> {
        match *self {
            Target::Entity { entity, .. } => Some(entity),
            Target::Point(_) => None,
        }
    }
}

// ── SteeringRequest ───────────────────────────────────────────────────────────

/// Registration parameters for one agent.
///
/// ```rust
/// use st_core::{EntityId, GridId, GridPoint, Vec2};
/// use st_steering::SteeringRequest;
///
/// let req = SteeringRequest::to_entity(EntityId(4), 1.0)
///     .arrival_distance(1.5)
///     .require_unobstructed(true);
/// assert_eq!(req.arrival_distance, 1.5);
///
/// let req = SteeringRequest::to_point(GridPoint::new(GridId(0), Vec2::new(3.5, 0.5)));
/// assert!(!req.requires_unobstructed);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SteeringRequest {
    pub target:                Target,
    /// Distance at which the agent counts as arrived.
    pub arrival_distance:      f32,
    /// Goal proximity passed through to the pathfinder.
    pub pathfinding_proximity: f32,
    /// When set, arrival additionally needs an unobstructed line to the target.
    pub requires_unobstructed: bool,
}

impl SteeringRequest {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            arrival_distance:      DEFAULT_ARRIVAL_DISTANCE,
            pathfinding_proximity: DEFAULT_PATH_PROXIMITY,
            requires_unobstructed: false,
        }
    }

    pub fn to_point(point: GridPoint) -> Self {
        Self::new(Target::Point(point))
    }

    pub fn to_entity(entity: EntityId, max_drift: f32) -> Self {
        Self::new(Target::Entity { entity, max_drift })
    }

    pub fn arrival_distance(mut self, distance: f32) -> Self {
        self.arrival_distance = distance;
        self
    }

    pub fn proximity(mut self, proximity: f32) -> Self {
        self.pathfinding_proximity = proximity;
        self
    }

    pub fn require_unobstructed(mut self, required: bool) -> Self {
        self.requires_unobstructed = required;
        self
    }
}

// ── SteeringStatus ────────────────────────────────────────────────────────────

/// Outcome of one agent evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SteeringStatus {
    /// Waiting on something: a route, a paused grid, or a re-plan.
    Pending,
    /// Cannot make progress.  Terminal.
    NoPath,
    /// Within arrival distance.  Terminal.
    Arrived,
    /// A direction was written this evaluation.
    Moving,
}

impl SteeringStatus {
    /// Terminal statuses cause the agent to be unregistered.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, SteeringStatus::NoPath | SteeringStatus::Arrived)
    }
}
