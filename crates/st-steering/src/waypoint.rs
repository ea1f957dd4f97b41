//! Route consumption.
//!
//! A finished route is trimmed once on arrival ([`trim_route`]) and then
//! consumed lazily by [`WaypointCache::resolve`]: the agent steers at the
//! centre of the cached tile until it is within tolerance, then pops the next.

use std::collections::VecDeque;

use st_core::{GridId, TileCoord, Vec2};
use st_world::GridService;

/// Drop leading waypoints the agent has already passed.
///
/// While the second waypoint is strictly closer (octile) to `agent_tile`
/// than the first, the first is dropped.  The result is a fixed point:
/// trimming it again changes nothing.
pub fn trim_route(agent_tile: TileCoord, mut route: VecDeque<TileCoord>) -> VecDeque<TileCoord> {
    while let (Some(&first), Some(&second)) = (route.front(), route.get(1)) {
        if agent_tile.octile_distance(second) < agent_tile.octile_distance(first) {
            route.pop_front();
        } else {
            break;
        }
    }
    route
}

/// The agent's current route plus the waypoint it is steering at.
#[derive(Clone, Debug, Default)]
pub struct WaypointCache {
    route: Option<VecDeque<TileCoord>>,
    next:  Option<Vec2>,
}

impl WaypointCache {
    /// Adopt a freshly planned route.  The cached waypoint is dropped so the
    /// new route is followed from its first tile.
    pub fn set_route(&mut self, route: VecDeque<TileCoord>) {
        self.route = Some(route);
        self.next = None;
    }

    /// Forget the route entirely; the agent will need a new one.
    pub fn clear(&mut self) {
        self.route = None;
        self.next = None;
    }

    pub fn has_route(&self) -> bool {
        self.route.is_some()
    }

    pub fn remaining(&self) -> usize {
        self.route.as_ref().map_or(0, VecDeque::len)
    }

    pub fn next_waypoint(&self) -> Option<Vec2> {
        self.next
    }

    /// The point to steer at this evaluation, or `None` when the agent needs
    /// a new route.
    ///
    /// With no route or an exhausted one, the target itself is returned while
    /// it is within `last_mile`.
    pub fn resolve<G: GridService + ?Sized>(
        &mut self,
        grids:     &G,
        grid:      GridId,
        agent:     Vec2,
        target:    Vec2,
        last_mile: f32,
        tolerance: f32,
    ) -> Option<Vec2> {
        let Some(route) = self.route.as_mut().filter(|r| !r.is_empty()) else {
            self.next = None;
            return (agent.distance(target) <= last_mile).then_some(target);
        };

        if let Some(next) = self.next {
            if agent.distance(next) > tolerance {
                return Some(next);
            }
        }

        // Tiles whose centre is already within tolerance are passed over,
        // except the last one.
        loop {
            let tile = route.pop_front()?;
            let next = grids.tile_center(grid, tile);
            if agent.distance(next) > tolerance || route.is_empty() {
                self.next = Some(next);
                return Some(next);
            }
        }
    }

    /// Skip leading route tiles that the avoidance pass flagged as occupied.
    ///
    /// At most `avoided.len()` tiles are dropped.  If anything was dropped
    /// the cached waypoint is released so the next resolve targets the new
    /// front of the route.  Returns the number of tiles skipped.
    pub fn skip_avoided(&mut self, avoided: &[TileCoord]) -> usize {
        let Some(route) = self.route.as_mut() else { return 0 };
        let mut skipped = 0;
        while skipped < avoided.len() {
            match route.front() {
                Some(tile) if avoided.contains(tile) => {
                    route.pop_front();
                    skipped += 1;
                }
                _ => break,
            }
        }
        if skipped > 0 && !route.is_empty() {
            self.next = None;
        }
        skipped
    }
}
