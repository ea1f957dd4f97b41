//! Steering behaviors.
//!
//! Every behavior returns a direction vector (unit length or zero).  The
//! engine sums seek with the avoidance correction and normalizes the result.

use std::f32::consts::FRAC_PI_2;

use st_core::{EntityId, GridId, TileCoord, Vec2};
use st_world::{Lifecycle, World};

/// Unit vector from `from` toward `to`, zero when they coincide.
#[inline]
pub fn seek(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Seek that scales down linearly inside `slowing_distance` of the target.
pub fn arrival(from: Vec2, to: Vec2, slowing_distance: f32) -> Vec2 {
    let offset = to - from;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let scale = if slowing_distance > 0.0 { (distance / slowing_distance).min(1.0) } else { 1.0 };
    offset / distance * scale
}

/// Seek toward where a moving target will be by the time an agent moving at
/// `speed` covers the current gap.
pub fn pursuit(from: Vec2, target: Vec2, target_velocity: Vec2, speed: f32) -> Vec2 {
    let lead = if speed > 0.0 { from.distance(target) / speed } else { 0.0 };
    seek(from, target + target_velocity * lead)
}

// ── Collision avoidance ───────────────────────────────────────────────────────

/// Result of one avoidance pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Avoidance {
    /// Correction to add to the seek direction.
    pub vector:  Vec2,
    /// Tiles in which an obstacle pushed back, in probe order.
    pub avoided: Vec<TileCoord>,
}

/// Steer around dynamic obstacles ahead of the agent.
///
/// The agent's own tile and the tiles half a step and a full step along
/// `direction` are probed.  In each tile the first occupant that qualifies
/// pushes the agent with strength `f = clamp(range - d, 0, 1)`: the offset to
/// the obstacle, scaled by `f` and rotated by `f · π/2`.  The summed push is
/// normalized, so the correction is a unit vector or zero.
///
/// An occupant qualifies when it is not the agent or in `ignored`, is alive,
/// has a physics body whose layer intersects the agent's collision mask, and
/// is not already moving in the same direction as the agent.  An occupant
/// without a velocity counts as standing still.
pub fn collision_avoidance<W: World + ?Sized>(
    world:     &W,
    entity:    EntityId,
    grid:      GridId,
    pos:       Vec2,
    direction: Vec2,
    ignored:   &[EntityId],
    range:     f32,
) -> Avoidance {
    let mut out = Avoidance::default();
    if direction.is_zero() {
        return out;
    }
    let Some(mask) = world.collision_mask(entity) else { return out };

    let mut tiles: Vec<TileCoord> = Vec::with_capacity(3);
    for probe in [pos, pos + direction * 0.5, pos + direction] {
        let tile = world.tile_at(grid, probe);
        if !tiles.contains(&tile) {
            tiles.push(tile);
        }
    }

    for tile in tiles {
        for occupant in world.occupants(grid, tile) {
            let other = occupant.entity;
            if other == entity
                || ignored.contains(&other)
                || occupant.layer & mask == 0
                || world.lifecycle(other) >= Lifecycle::Deleting
            {
                continue;
            }
            let Some(other_pos) = world.position(other) else { continue };
            let other_vel = world.velocity(other).unwrap_or(Vec2::ZERO);
            if other_vel.dot(direction) > 0.0 {
                continue;
            }

            let offset = other_pos - pos;
            let strength = (range - offset.length()).clamp(0.0, 1.0);
            if strength <= 0.0 {
                continue;
            }
            out.vector += (offset * strength).rotate(FRAC_PI_2 * strength);
            out.avoided.push(tile);
            // One obstacle per tile is enough to steer around it.
            break;
        }
    }
    out.vector = out.vector.normalize_or_zero();
    out
}
