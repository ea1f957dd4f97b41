//! Read-only view of the host's entity data.

use st_core::{EntityId, GridId, Vec2};

/// Where an entity is in its life.  Ordered so that
/// `lifecycle >= Lifecycle::Deleting` means "going away".
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    Alive,
    Deleting,
    Deleted,
}

/// Entity queries the steering engine performs.
///
/// Unknown entities must report [`Lifecycle::Deleted`] and `None` for the
/// optional queries.
pub trait EntityView {
    fn lifecycle(&self, entity: EntityId) -> Lifecycle;

    /// Whether the entity carries a movement controller the engine can drive.
    fn has_mover(&self, entity: EntityId) -> bool;

    /// Capability check: stunned, buckled, and similar states return `false`.
    fn can_move(&self, entity: EntityId) -> bool;

    /// The grid the entity stands on.  May be [`GridId::INVALID`] in space.
    fn grid_of(&self, entity: EntityId) -> Option<GridId>;

    /// Grid-local position.
    fn position(&self, entity: EntityId) -> Option<Vec2>;

    /// Current linear velocity, if the entity has a physics body.
    fn velocity(&self, entity: EntityId) -> Option<Vec2>;

    /// Collision mask of the entity's physics body, if any.
    fn collision_mask(&self, entity: EntityId) -> Option<u32>;

    /// Access credentials handed to the pathfinder (doors, airlocks, ...).
    fn access_tags(&self, entity: EntityId) -> Vec<String>;

    /// Line-of-sight and range test used before declaring arrival.
    fn in_range_unobstructed(&self, entity: EntityId, target: Vec2, range: f32) -> bool;
}
