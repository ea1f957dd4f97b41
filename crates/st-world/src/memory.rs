//! `MemoryWorld`: a small in-memory host implementing every world trait.
//!
//! Tiles are one world unit wide; tile `(x, y)` covers `[x, x+1) × [y, y+1)`
//! and its centre is `(x + 0.5, y + 0.5)`.  Blocked tiles are impassable
//! walls; entities with a `collision_layer` show up as dynamic occupants of
//! the tile they stand on.

use rustc_hash::{FxHashMap, FxHashSet};
use st_core::{EntityId, GridId, TileCoord, Vec2};

use crate::{Actuator, EntityView, GridService, Lifecycle, Occupant, TraversalOracle};

/// Step used when sampling a segment for line-of-sight.
const LOS_STEP: f32 = 0.25;

/// State of one entity.  All fields are public so tests can poke at them.
#[derive(Clone, Debug)]
pub struct MemoryEntity {
    pub grid:            GridId,
    pub pos:             Vec2,
    pub velocity:        Vec2,
    pub lifecycle:       Lifecycle,
    pub has_mover:       bool,
    pub can_move:        bool,
    pub collision_mask:  Option<u32>,
    /// When set, the entity is a dynamic obstacle on this layer.
    pub collision_layer: Option<u32>,
    pub access:          Vec<String>,
}

impl MemoryEntity {
    fn new(grid: GridId, pos: Vec2) -> Self {
        Self {
            grid,
            pos,
            velocity:        Vec2::ZERO,
            lifecycle:       Lifecycle::Alive,
            has_mover:       true,
            can_move:        true,
            collision_mask:  None,
            collision_layer: None,
            access:          Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct MemoryGrid {
    paused:  bool,
    blocked: FxHashSet<TileCoord>,
}

/// In-memory entities, grids, and steering outputs.
#[derive(Default)]
pub struct MemoryWorld {
    entities:    FxHashMap<EntityId, MemoryEntity>,
    grids:       FxHashMap<GridId, MemoryGrid>,
    directions:  FxHashMap<EntityId, Vec2>,
    next_entity: u32,
    next_grid:   u32,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Construction ──────────────────────────────────────────────────────

    pub fn add_grid(&mut self) -> GridId {
        let id = GridId(self.next_grid);
        self.next_grid += 1;
        self.grids.insert(id, MemoryGrid::default());
        id
    }

    /// Spawn an alive entity with a mover and no physics body.
    pub fn spawn(&mut self, grid: GridId, pos: Vec2) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.entities.insert(id, MemoryEntity::new(grid, pos));
        id
    }

    /// Spawn an entity that also acts as a dynamic obstacle on `layer` and
    /// collides with `mask`.
    pub fn spawn_body(&mut self, grid: GridId, pos: Vec2, mask: u32, layer: u32) -> EntityId {
        let id = self.spawn(grid, pos);
        if let Some(e) = self.entities.get_mut(&id) {
            e.collision_mask = Some(mask);
            e.collision_layer = Some(layer);
        }
        id
    }

    /// Remove the entity; later queries report it as deleted.
    pub fn despawn(&mut self, entity: EntityId) {
        self.entities.remove(&entity);
        self.directions.remove(&entity);
    }

    pub fn entity(&self, entity: EntityId) -> Option<&MemoryEntity> {
        self.entities.get(&entity)
    }

    pub fn entity_mut(&mut self, entity: EntityId) -> Option<&mut MemoryEntity> {
        self.entities.get_mut(&entity)
    }

    pub fn set_position(&mut self, entity: EntityId, pos: Vec2) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.pos = pos;
        }
    }

    pub fn set_paused(&mut self, grid: GridId, paused: bool) {
        if let Some(g) = self.grids.get_mut(&grid) {
            g.paused = paused;
        }
    }

    pub fn block_tile(&mut self, grid: GridId, tile: TileCoord) {
        if let Some(g) = self.grids.get_mut(&grid) {
            g.blocked.insert(tile);
        }
    }

    pub fn is_blocked(&self, grid: GridId, tile: TileCoord) -> bool {
        self.grids.get(&grid).is_some_and(|g| g.blocked.contains(&tile))
    }

    // ── Output inspection ─────────────────────────────────────────────────

    /// Last direction written by the engine for `entity` (zero if never).
    pub fn desired_direction(&self, entity: EntityId) -> Vec2 {
        self.directions.get(&entity).copied().unwrap_or(Vec2::ZERO)
    }

    // ── Motion ────────────────────────────────────────────────────────────

    /// Move every mobile entity along its desired direction at `speed` for
    /// `dt` seconds.  Moves into blocked tiles are refused (the entity stays
    /// put with zero velocity).
    pub fn integrate(&mut self, dt: f32, speed: f32) {
        for (id, e) in self.entities.iter_mut() {
            if e.lifecycle != Lifecycle::Alive || !e.has_mover || !e.can_move {
                continue;
            }
            let dir = self.directions.get(id).copied().unwrap_or(Vec2::ZERO);
            let next = e.pos + dir * (speed * dt);
            let blocked = self
                .grids
                .get(&e.grid)
                .is_some_and(|g| g.blocked.contains(&tile_of(next)));
            if blocked {
                e.velocity = Vec2::ZERO;
            } else {
                e.velocity = dir * speed;
                e.pos = next;
            }
        }
    }
}

#[inline]
fn tile_of(pos: Vec2) -> TileCoord {
    TileCoord::new(pos.x.floor() as i32, pos.y.floor() as i32)
}

// ── Trait impls ───────────────────────────────────────────────────────────────

impl EntityView for MemoryWorld {
    fn lifecycle(&self, entity: EntityId) -> Lifecycle {
        self.entities.get(&entity).map_or(Lifecycle::Deleted, |e| e.lifecycle)
    }

    fn has_mover(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|e| e.has_mover)
    }

    fn can_move(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|e| e.can_move)
    }

    fn grid_of(&self, entity: EntityId) -> Option<GridId> {
        self.entities.get(&entity).map(|e| e.grid)
    }

    fn position(&self, entity: EntityId) -> Option<Vec2> {
        self.entities.get(&entity).map(|e| e.pos)
    }

    fn velocity(&self, entity: EntityId) -> Option<Vec2> {
        self.entities
            .get(&entity)
            .filter(|e| e.collision_mask.is_some() || e.collision_layer.is_some())
            .map(|e| e.velocity)
    }

    fn collision_mask(&self, entity: EntityId) -> Option<u32> {
        self.entities.get(&entity).and_then(|e| e.collision_mask)
    }

    fn access_tags(&self, entity: EntityId) -> Vec<String> {
        self.entities.get(&entity).map(|e| e.access.clone()).unwrap_or_default()
    }

    fn in_range_unobstructed(&self, entity: EntityId, target: Vec2, range: f32) -> bool {
        let Some(e) = self.entities.get(&entity) else { return false };
        let delta = target - e.pos;
        let dist = delta.length();
        if dist > range {
            return false;
        }
        let steps = (dist / LOS_STEP).ceil() as usize;
        (1..=steps).all(|i| {
            let t = i as f32 / steps as f32;
            !self.is_blocked(e.grid, tile_of(e.pos + delta * t))
        })
    }
}

impl GridService for MemoryWorld {
    fn is_valid(&self, grid: GridId) -> bool {
        grid.is_valid() && self.grids.contains_key(&grid)
    }

    fn is_paused(&self, grid: GridId) -> bool {
        self.grids.get(&grid).is_some_and(|g| g.paused)
    }

    fn tile_at(&self, _grid: GridId, pos: Vec2) -> TileCoord {
        tile_of(pos)
    }

    fn tile_center(&self, _grid: GridId, tile: TileCoord) -> Vec2 {
        Vec2::new(tile.x as f32 + 0.5, tile.y as f32 + 0.5)
    }
}

impl TraversalOracle for MemoryWorld {
    fn can_traverse(&self, _entity: EntityId, grid: GridId, point: Vec2) -> bool {
        self.grids.contains_key(&grid) && !self.is_blocked(grid, tile_of(point))
    }

    fn occupants(&self, grid: GridId, tile: TileCoord) -> Vec<Occupant> {
        let mut found: Vec<Occupant> = self
            .entities
            .iter()
            .filter(|(_, e)| e.grid == grid && tile_of(e.pos) == tile)
            .filter_map(|(&entity, e)| e.collision_layer.map(|layer| Occupant { entity, layer }))
            .collect();
        // Hash order is arbitrary; keep results reproducible.
        found.sort_by_key(|o| o.entity);
        found
    }
}

impl Actuator for MemoryWorld {
    fn set_desired_direction(&mut self, entity: EntityId, direction: Vec2) {
        self.directions.insert(entity, direction);
    }
}
