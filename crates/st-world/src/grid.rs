//! Tile grid coordinate service and traversal queries.

use st_core::{EntityId, GridId, TileCoord, Vec2};

/// A dynamic obstacle standing on a tile, with the collision layer it
/// occupies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Occupant {
    pub entity: EntityId,
    pub layer:  u32,
}

/// Tile ↔ world conversion and per-grid simulation state.
pub trait GridService {
    fn is_valid(&self, grid: GridId) -> bool;

    /// A paused grid is frozen; agents on it wait rather than fail.
    fn is_paused(&self, grid: GridId) -> bool;

    /// Tile containing `pos`.
    fn tile_at(&self, grid: GridId, pos: Vec2) -> TileCoord;

    /// World-space centre of `tile`.
    fn tile_center(&self, grid: GridId, tile: TileCoord) -> Vec2;
}

/// Answers "can this entity move onto this spot" and "who is standing here".
pub trait TraversalOracle {
    fn can_traverse(&self, entity: EntityId, grid: GridId, point: Vec2) -> bool;

    /// Dynamic (non-anchored) obstacles on `tile`.  Static geometry is
    /// assumed to be handled by the pathfinder already.
    fn occupants(&self, grid: GridId, tile: TileCoord) -> Vec<Occupant>;
}
