//! Unit tests for st-steering.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use st_core::{EntityId, GridId, GridPoint, PathError, SteerError, TileCoord, Vec2};
use st_world::{
    Actuator, CancelToken, EntityView, GridService, JobHandle, JobStatus, Lifecycle, MemoryWorld,
    Occupant, PathRequest, Pathfinder, QueuedPathfinder, Route, TraversalOracle,
};

use crate::{
    SteeringEngine, SteeringEngineBuilder, SteeringObserver, SteeringRequest, SteeringStatus,
    StuckTracker, TickScheduler, TickSummary, WaypointCache, trim_route,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const DT: f32 = 0.05;

fn engine(buckets: usize) -> SteeringEngine<QueuedPathfinder> {
    SteeringEngineBuilder::new(QueuedPathfinder::new())
        .bucket_count(buckets)
        .build()
        .unwrap()
}

fn world() -> (MemoryWorld, GridId) {
    let mut world = MemoryWorld::new();
    let grid = world.add_grid();
    (world, grid)
}

fn point(grid: GridId, x: f32, y: f32) -> SteeringRequest {
    SteeringRequest::to_point(GridPoint::new(grid, Vec2::new(x, y)))
}

/// Walk along x, then along y.
fn straight(req: &PathRequest) -> Result<Route, PathError> {
    let (s, e) = (req.start, req.end);
    let mut route = Vec::new();
    let step_x = if e.x >= s.x { 1 } else { -1 };
    let step_y = if e.y >= s.y { 1 } else { -1 };
    let mut x = s.x;
    loop {
        route.push(TileCoord::new(x, s.y));
        if x == e.x {
            break;
        }
        x += step_x;
    }
    let mut y = s.y;
    while y != e.y {
        y += step_y;
        route.push(TileCoord::new(e.x, y));
    }
    Ok(route)
}

fn tiles(coords: &[(i32, i32)]) -> VecDeque<TileCoord> {
    coords.iter().map(|&(x, y)| TileCoord::new(x, y)).collect()
}

fn is_unit_or_zero(v: Vec2) -> bool {
    v.is_zero() || (v.length() - 1.0).abs() < 1e-4
}

#[derive(Default)]
struct Recorder {
    starts:    usize,
    ends:      Vec<TickSummary>,
    statuses:  Vec<(EntityId, SteeringStatus)>,
    requested: Vec<EntityId>,
    stuck:     Vec<EntityId>,
}

impl SteeringObserver for Recorder {
    fn on_tick_start(&mut self, _bucket: usize) {
        self.starts += 1;
    }
    fn on_status(&mut self, entity: EntityId, status: SteeringStatus) {
        self.statuses.push((entity, status));
    }
    fn on_path_requested(&mut self, entity: EntityId) {
        self.requested.push(entity);
    }
    fn on_stuck(&mut self, entity: EntityId) {
        self.stuck.push(entity);
    }
    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.ends.push(*summary);
    }
}

// ── Route trimming and consumption ────────────────────────────────────────────

#[cfg(test)]
mod waypoint {
    use super::*;

    #[test]
    fn trim_drops_passed_waypoint() {
        let route = trim_route(TileCoord::new(1, 0), tiles(&[(0, 0), (1, 0), (2, 0)]));
        assert_eq!(route, tiles(&[(1, 0), (2, 0)]));
    }

    #[test]
    fn trim_keeps_route_when_front_is_closest() {
        let route = trim_route(TileCoord::new(0, 0), tiles(&[(0, 0), (1, 0), (2, 0)]));
        assert_eq!(route.len(), 3);
        assert!(trim_route(TileCoord::new(5, 5), VecDeque::new()).is_empty());
        assert_eq!(trim_route(TileCoord::new(5, 5), tiles(&[(0, 0)])).len(), 1);
    }

    #[test]
    fn trim_is_idempotent() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..500 {
            let len = rng.gen_range(0..8);
            let route: VecDeque<TileCoord> = (0..len)
                .map(|_| TileCoord::new(rng.gen_range(-5..5), rng.gen_range(-5..5)))
                .collect();
            let agent = TileCoord::new(rng.gen_range(-5..5), rng.gen_range(-5..5));
            let once = trim_route(agent, route);
            let twice = trim_route(agent, once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn no_route_falls_back_to_last_mile() {
        let (world, g) = world();
        let mut cache = WaypointCache::default();
        let agent = Vec2::new(0.5, 0.5);
        assert_eq!(
            cache.resolve(&world, g, agent, Vec2::new(1.5, 0.5), 2.0, 0.8),
            Some(Vec2::new(1.5, 0.5)),
        );
        assert_eq!(cache.resolve(&world, g, agent, Vec2::new(5.5, 0.5), 2.0, 0.8), None);
    }

    #[test]
    fn resolve_advances_within_tolerance() {
        let (world, g) = world();
        let target = Vec2::new(2.5, 0.5);
        let mut cache = WaypointCache::default();
        cache.set_route(tiles(&[(1, 0), (2, 0)]));

        let first = cache.resolve(&world, g, Vec2::new(0.5, 0.5), target, 2.0, 0.8);
        assert_eq!(first, Some(Vec2::new(1.5, 0.5)));
        assert_eq!(cache.remaining(), 1);

        // Still farther than the tolerance: keep the cached waypoint.
        let again = cache.resolve(&world, g, Vec2::new(0.6, 0.5), target, 2.0, 0.8);
        assert_eq!(again, first);
        assert_eq!(cache.remaining(), 1);

        let next = cache.resolve(&world, g, Vec2::new(1.4, 0.5), target, 2.0, 0.8);
        assert_eq!(next, Some(Vec2::new(2.5, 0.5)));
        assert_eq!(cache.remaining(), 0);

        // Exhausted: last mile straight at the target.
        let last = cache.resolve(&world, g, Vec2::new(2.4, 0.5), target, 2.0, 0.8);
        assert_eq!(last, Some(target));
        assert!(cache.next_waypoint().is_none());
    }

    #[test]
    fn resolve_skips_reached_tiles() {
        let (world, g) = world();
        let mut cache = WaypointCache::default();
        cache.set_route(tiles(&[(0, 0), (1, 0), (2, 0)]));
        let next = cache.resolve(&world, g, Vec2::new(0.5, 0.5), Vec2::new(2.5, 0.5), 2.0, 0.8);
        assert_eq!(next, Some(Vec2::new(1.5, 0.5)));
        assert_eq!(cache.remaining(), 1);
    }

    #[test]
    fn skipping_avoided_tiles_releases_cache() {
        let (world, g) = world();
        let mut cache = WaypointCache::default();
        cache.set_route(tiles(&[(1, 0), (2, 0), (3, 0)]));
        cache.resolve(&world, g, Vec2::new(0.5, 0.5), Vec2::new(3.5, 0.5), 2.0, 0.8);
        assert!(cache.next_waypoint().is_some());

        assert_eq!(cache.skip_avoided(&[TileCoord::new(9, 9)]), 0);
        assert!(cache.next_waypoint().is_some());

        assert_eq!(cache.skip_avoided(&[TileCoord::new(2, 0)]), 1);
        assert!(cache.next_waypoint().is_none());
        assert_eq!(cache.remaining(), 1);
    }

    #[test]
    fn clear_drops_route() {
        let mut cache = WaypointCache::default();
        cache.set_route(tiles(&[(1, 0)]));
        assert!(cache.has_route());
        cache.clear();
        assert!(!cache.has_route());
    }
}

// ── Stuck detection ───────────────────────────────────────────────────────────

#[cfg(test)]
mod stuck {
    use super::*;

    #[test]
    fn fires_after_threshold_then_restarts() {
        let mut t = StuckTracker::default();
        let p = Vec2::new(3.0, 3.0);
        assert!(!t.observe(p, 1.0, 3)); // anchors
        assert!(!t.observe(p, 1.0, 3));
        assert!(!t.observe(p, 1.0, 3));
        assert!(t.observe(p, 1.0, 3));
        assert_eq!(t.counter(), 0);
    }

    #[test]
    fn movement_reanchors() {
        let mut t = StuckTracker::default();
        t.observe(Vec2::ZERO, 1.0, 3);
        t.observe(Vec2::new(0.5, 0.0), 1.0, 3);
        assert_eq!(t.counter(), 1);
        assert!(!t.observe(Vec2::new(2.0, 0.0), 1.0, 3));
        assert_eq!(t.counter(), 0);
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler {
    use super::*;

    #[test]
    fn least_loaded_prefers_lowest_index() {
        let mut s = TickScheduler::new(3);
        assert_eq!(s.least_loaded(), 0);
        s.add(0);
        assert_eq!(s.least_loaded(), 1);
        s.add(1);
        s.add(2);
        assert_eq!(s.least_loaded(), 0);
        s.remove(1);
        assert_eq!(s.least_loaded(), 1);
    }

    #[test]
    fn rotation_wraps() {
        let mut s = TickScheduler::new(2);
        assert_eq!(s.active(), 0);
        s.advance();
        assert_eq!(s.active(), 1);
        s.advance();
        assert_eq!(s.active(), 0);
    }

    #[test]
    fn elapsed_scales_with_bucket_count() {
        assert!((TickScheduler::new(2).effective_elapsed(0.1) - 0.2).abs() < 1e-6);
        assert_eq!(TickScheduler::new(0).bucket_count(), 1);
    }
}

// ── Behaviors ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod behavior {
    use super::*;
    use crate::behavior::{arrival, collision_avoidance, pursuit, seek};

    #[test]
    fn seek_is_unit_or_zero() {
        assert_eq!(seek(Vec2::ZERO, Vec2::new(3.0, 0.0)), Vec2::new(1.0, 0.0));
        assert!(seek(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0)).is_zero());
    }

    #[test]
    fn arrival_slows_inside_radius() {
        let v = arrival(Vec2::ZERO, Vec2::new(1.0, 0.0), 2.0);
        assert!((v.x - 0.5).abs() < 1e-6);
        let v = arrival(Vec2::ZERO, Vec2::new(4.0, 0.0), 2.0);
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pursuit_leads_moving_target() {
        let v = pursuit(Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(0.0, 1.0), 2.0);
        assert!(v.y > 0.0);
        assert!(is_unit_or_zero(v));
        // A standing agent aims straight at the target.
        assert_eq!(pursuit(Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(0.0, 1.0), 0.0), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn no_push_without_direction_or_body() {
        let (mut world, g) = world();
        let agent = world.spawn(g, Vec2::new(0.5, 0.5));
        world.spawn_body(g, Vec2::new(1.5, 0.5), 1, 1);
        let east = Vec2::new(1.0, 0.0);

        // No collision mask on the agent.
        let a = collision_avoidance(&world, agent, g, Vec2::new(0.5, 0.5), east, &[], 2.5);
        assert!(a.vector.is_zero());

        let body = world.spawn_body(g, Vec2::new(0.5, 0.2), 1, 1);
        let a = collision_avoidance(&world, body, g, Vec2::new(0.5, 0.2), Vec2::ZERO, &[], 2.5);
        assert!(a.vector.is_zero());
        assert!(a.avoided.is_empty());
    }

    #[test]
    fn obstacle_ahead_pushes_sideways() {
        let (mut world, g) = world();
        let agent = world.spawn_body(g, Vec2::new(0.5, 0.5), 1, 1);
        world.spawn_body(g, Vec2::new(1.5, 0.5), 1, 1);

        let a = collision_avoidance(&world, agent, g, Vec2::new(0.5, 0.5), Vec2::new(1.0, 0.0), &[], 2.5);
        assert_eq!(a.avoided, vec![TileCoord::new(1, 0)]);
        // Full strength at distance 1: offset rotated a quarter turn.
        assert!(a.vector.x.abs() < 1e-5);
        assert!((a.vector.y.abs() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn irrelevant_obstacles_are_ignored() {
        let (mut world, g) = world();
        let pos = Vec2::new(0.5, 0.5);
        let east = Vec2::new(1.0, 0.0);
        let agent = world.spawn_body(g, pos, 1, 1);
        let other = world.spawn_body(g, Vec2::new(1.5, 0.5), 1, 1);

        // Explicitly ignored (e.g. the target).
        assert!(collision_avoidance(&world, agent, g, pos, east, &[other], 2.5).vector.is_zero());

        // Moving the same way.
        if let Some(e) = world.entity_mut(other) {
            e.velocity = Vec2::new(1.0, 0.0);
        }
        assert!(collision_avoidance(&world, agent, g, pos, east, &[], 2.5).vector.is_zero());

        // Different layer.
        if let Some(e) = world.entity_mut(other) {
            e.velocity = Vec2::ZERO;
            e.collision_layer = Some(2);
        }
        assert!(collision_avoidance(&world, agent, g, pos, east, &[], 2.5).vector.is_zero());

        // Being deleted.
        if let Some(e) = world.entity_mut(other) {
            e.collision_layer = Some(1);
            e.lifecycle = Lifecycle::Deleting;
        }
        assert!(collision_avoidance(&world, agent, g, pos, east, &[], 2.5).vector.is_zero());

        // Out of range.
        if let Some(e) = world.entity_mut(other) {
            e.lifecycle = Lifecycle::Alive;
        }
        assert!(collision_avoidance(&world, agent, g, pos, east, &[], 1.0).vector.is_zero());
    }

    #[test]
    fn push_is_unit_length_off_the_unit_distance() {
        let (mut world, g) = world();
        let pos = Vec2::new(0.5, 0.5);
        let agent = world.spawn_body(g, pos, 1, 1);
        world.spawn_body(g, Vec2::new(1.8, 0.9), 1, 1);

        let a = collision_avoidance(&world, agent, g, pos, Vec2::new(1.0, 0.0), &[], 2.5);
        assert_eq!(a.avoided, vec![TileCoord::new(1, 0)]);
        assert!((a.vector.length() - 1.0).abs() < 1e-4);
        assert!(a.vector.y > 0.0);
    }

    #[test]
    fn avoidance_is_always_unit_or_zero() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..200 {
            let (mut world, g) = world();
            let pos = Vec2::new(rng.gen_range(2.0..4.0), rng.gen_range(2.0..4.0));
            let agent = world.spawn_body(g, pos, 1, 1);
            for _ in 0..rng.gen_range(0..6) {
                let p = pos + Vec2::new(rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5));
                world.spawn_body(g, p, 1, 1);
            }
            let direction = Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)).normalize_or_zero();
            let range = rng.gen_range(0.5..3.0);

            let a = collision_avoidance(&world, agent, g, pos, direction, &[], range);
            assert!(is_unit_or_zero(a.vector), "{:?} is neither unit nor zero", a.vector);
            assert_eq!(a.vector.is_zero(), a.avoided.is_empty());
        }
    }

    /// Reports no velocity for any entity, as a host without physics would.
    struct Stationary(MemoryWorld);

    impl EntityView for Stationary {
        fn lifecycle(&self, entity: EntityId) -> Lifecycle {
            self.0.lifecycle(entity)
        }
        fn has_mover(&self, entity: EntityId) -> bool {
            self.0.has_mover(entity)
        }
        fn can_move(&self, entity: EntityId) -> bool {
            self.0.can_move(entity)
        }
        fn grid_of(&self, entity: EntityId) -> Option<GridId> {
            self.0.grid_of(entity)
        }
        fn position(&self, entity: EntityId) -> Option<Vec2> {
            self.0.position(entity)
        }
        fn velocity(&self, _entity: EntityId) -> Option<Vec2> {
            None
        }
        fn collision_mask(&self, entity: EntityId) -> Option<u32> {
            self.0.collision_mask(entity)
        }
        fn access_tags(&self, entity: EntityId) -> Vec<String> {
            self.0.access_tags(entity)
        }
        fn in_range_unobstructed(&self, entity: EntityId, target: Vec2, range: f32) -> bool {
            self.0.in_range_unobstructed(entity, target, range)
        }
    }

    impl GridService for Stationary {
        fn is_valid(&self, grid: GridId) -> bool {
            self.0.is_valid(grid)
        }
        fn is_paused(&self, grid: GridId) -> bool {
            self.0.is_paused(grid)
        }
        fn tile_at(&self, grid: GridId, pos: Vec2) -> TileCoord {
            self.0.tile_at(grid, pos)
        }
        fn tile_center(&self, grid: GridId, tile: TileCoord) -> Vec2 {
            self.0.tile_center(grid, tile)
        }
    }

    impl TraversalOracle for Stationary {
        fn can_traverse(&self, entity: EntityId, grid: GridId, point: Vec2) -> bool {
            self.0.can_traverse(entity, grid, point)
        }
        fn occupants(&self, grid: GridId, tile: TileCoord) -> Vec<Occupant> {
            self.0.occupants(grid, tile)
        }
    }

    impl Actuator for Stationary {
        fn set_desired_direction(&mut self, entity: EntityId, direction: Vec2) {
            self.0.set_desired_direction(entity, direction);
        }
    }

    #[test]
    fn obstacle_without_velocity_still_pushes() {
        let (mut inner, g) = world();
        let pos = Vec2::new(0.5, 0.5);
        let agent = inner.spawn_body(g, pos, 1, 1);
        inner.spawn_body(g, Vec2::new(1.5, 0.5), 1, 1);
        let world = Stationary(inner);

        let a = collision_avoidance(&world, agent, g, pos, Vec2::new(1.0, 0.0), &[], 2.5);
        assert_eq!(a.avoided, vec![TileCoord::new(1, 0)]);
        assert!(is_unit_or_zero(a.vector));
        assert!(!a.vector.is_zero());
    }
}

// ── Agent store ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use super::*;
    use crate::{AgentRecord, AgentStore};

    #[test]
    fn removal_keeps_index_dense() {
        let (g, mut store) = (GridId(0), AgentStore::new());
        for i in 0..3 {
            store.insert(AgentRecord::new(EntityId(i), point(g, 1.5, 0.5), 0));
        }
        assert!(store.remove(EntityId(0)).is_some());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(EntityId(2)).map(|r| r.entity), Some(EntityId(2)));
        assert!(store.remove(EntityId(0)).is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already has a record")]
    fn second_record_for_entity_is_rejected() {
        let mut store = AgentStore::new();
        store.insert(AgentRecord::new(EntityId(1), point(GridId(0), 1.5, 0.5), 0));
        store.insert(AgentRecord::new(EntityId(1), point(GridId(0), 2.5, 0.5), 1));
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use super::*;

    #[test]
    fn registration_balances_buckets() {
        let (mut world, g) = world();
        let mut eng = engine(2);
        let ids: Vec<EntityId> = (0..3).map(|i| world.spawn(g, Vec2::new(i as f32, 0.5))).collect();
        for &id in &ids {
            eng.register(id, point(g, 9.5, 0.5));
        }
        assert_eq!(eng.bucket_sizes(), &[2, 1]);
        assert_eq!(eng.len(), 3);

        eng.unregister(&mut world, ids[0]).unwrap();
        assert_eq!(eng.bucket_sizes(), &[1, 1]);
        assert!(!eng.is_registered(ids[0]));
        assert!(eng.is_registered(ids[2]));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn double_registration_panics() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 5.5, 0.5));
        eng.register(a, point(g, 6.5, 0.5));
    }

    #[test]
    fn unregister_unknown_is_an_error() {
        let (mut world, _) = world();
        let mut eng = engine(1);
        assert!(matches!(
            eng.unregister(&mut world, EntityId(3)),
            Err(SteerError::NotRegistered(EntityId(3)))
        ));
    }

    #[test]
    fn arrives_on_first_evaluation() {
        let (mut world, g) = world();
        let mut eng = engine(2);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 0.9, 0.5));

        let summary = eng.tick(&mut world, DT).unwrap();
        assert_eq!(summary.arrived, 1);
        assert!(!eng.is_registered(a));
        assert!(world.desired_direction(a).is_zero());
        assert_eq!(eng.pathfinder.submitted(), 0);
    }

    #[test]
    fn far_agent_requests_exactly_one_job() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));

        for _ in 0..3 {
            let summary = eng.tick(&mut world, DT).unwrap();
            assert_eq!(summary.pending, 1);
        }
        assert_eq!(eng.pathfinder.submitted(), 1);
        assert_eq!(eng.status(a), Some(SteeringStatus::Pending));
        let req = eng.pathfinder.queued_requests().next().cloned();
        assert_eq!(req.map(|r| (r.start, r.end)), Some((TileCoord::new(0, 0), TileCoord::new(8, 0))));
    }

    #[test]
    fn follows_route_once_job_finishes() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));

        eng.tick(&mut world, DT).unwrap();
        eng.pathfinder.pump(4, straight);

        // Route is installed, nothing written yet.
        assert_eq!(eng.tick(&mut world, DT).unwrap().pending, 1);
        assert!(eng.agent(a).is_some_and(|r| r.waypoints.has_route()));

        assert_eq!(eng.tick(&mut world, DT).unwrap().moving, 1);
        let dir = world.desired_direction(a);
        assert!((dir.x - 1.0).abs() < 1e-5 && dir.y.abs() < 1e-5);
    }

    #[test]
    fn walks_to_target_and_arrives() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 6.5, 3.5));

        let mut rec = Recorder::default();
        for _ in 0..400 {
            if !eng.is_registered(a) {
                break;
            }
            eng.tick_observed(&mut world, DT, &mut rec).unwrap();
            eng.pathfinder.pump(4, straight);
            world.integrate(DT, 4.0);
        }
        assert!(!eng.is_registered(a));
        assert_eq!(rec.statuses.last(), Some(&(a, SteeringStatus::Arrived)));
        let pos = world.position(a).unwrap_or_default();
        assert!(pos.distance(Vec2::new(6.5, 3.5)) <= 0.5 + 1e-4);
        assert!(rec.stuck.is_empty());
    }

    #[test]
    fn drifting_target_triggers_replan_while_moving() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let target = world.spawn(g, Vec2::new(8.5, 0.5));
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, SteeringRequest::to_entity(target, 1.0));

        eng.tick(&mut world, DT).unwrap();
        eng.pathfinder.pump(4, straight);
        eng.tick(&mut world, DT).unwrap();
        assert_eq!(eng.tick(&mut world, DT).unwrap().moving, 1);

        world.set_position(target, Vec2::new(8.5, 3.5));
        let summary = eng.tick(&mut world, DT).unwrap();
        assert_eq!(summary.moving, 1);
        assert_eq!(eng.pathfinder.submitted(), 2);
        assert!(!world.desired_direction(a).is_zero());

        // The new route re-anchors the target.
        eng.pathfinder.pump(4, straight);
        eng.tick(&mut world, DT).unwrap();
        eng.tick(&mut world, DT).unwrap();
        assert_eq!(eng.pathfinder.submitted(), 2);
    }

    #[test]
    fn cancelled_job_reports_no_path() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));

        eng.tick(&mut world, DT).unwrap();
        eng.pathfinder.pump(4, |_| Err(PathError::Cancelled));
        let summary = eng.tick(&mut world, DT).unwrap();
        assert_eq!(summary.no_path, 1);
        assert!(!eng.is_registered(a));
    }

    #[test]
    fn empty_route_reports_no_path() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));

        eng.tick(&mut world, DT).unwrap();
        eng.pathfinder.pump(4, |_| Ok(Vec::new()));
        assert_eq!(eng.tick(&mut world, DT).unwrap().no_path, 1);
        assert!(!eng.is_registered(a));
    }

    /// Marks every job finished without ever storing an outcome.
    struct Hollow;

    impl Pathfinder for Hollow {
        fn submit(&mut self, _request: PathRequest, _cancel: CancelToken) -> JobHandle {
            let handle = JobHandle::new();
            handle.set_status(JobStatus::Finished);
            handle
        }
    }

    #[test]
    fn finished_job_without_outcome_reports_no_path() {
        let (mut world, g) = world();
        let mut eng = SteeringEngine::new(Hollow);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));

        assert_eq!(eng.tick(&mut world, DT).unwrap().pending, 1);
        let summary = eng.tick(&mut world, DT).unwrap();
        assert_eq!(summary.no_path, 1);
        assert!(!eng.is_registered(a));
        assert!(world.desired_direction(a).is_zero());
    }

    #[test]
    fn job_fault_is_fatal() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));

        eng.tick(&mut world, DT).unwrap();
        eng.pathfinder.pump(4, |_| Err(PathError::Failed("boom".into())));
        match eng.tick(&mut world, DT) {
            Err(SteerError::PathJob { entity, source }) => {
                assert_eq!(entity, a);
                assert_eq!(source, PathError::Failed("boom".into()));
            }
            other => panic!("expected a path job fault, got {other:?}"),
        }

        // The agent stays registered and plans again.
        assert!(eng.is_registered(a));
        eng.tick(&mut world, DT).unwrap();
        assert_eq!(eng.pathfinder.submitted(), 2);
    }

    #[test]
    fn unregister_cancels_outstanding_job() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));

        eng.tick(&mut world, DT).unwrap();
        eng.unregister(&mut world, a).unwrap();
        let mut searched = 0;
        let ran = eng.pathfinder.pump(4, |r| {
            searched += 1;
            straight(r)
        });
        assert_eq!((ran, searched), (0, 0));
        assert_eq!(eng.pathfinder.queued(), 0);
    }

    #[test]
    fn unregister_surfaces_finished_fault() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));

        eng.tick(&mut world, DT).unwrap();
        eng.pathfinder.pump(4, |_| Err(PathError::NoEnd));
        let result = eng.unregister(&mut world, a);
        assert!(matches!(result, Err(SteerError::PathJob { source: PathError::NoEnd, .. })));
        assert!(!eng.is_registered(a));
        assert_eq!(eng.bucket_sizes(), &[0]);
    }

    #[test]
    fn unregister_zeroes_output() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 1.9, 0.5));

        assert_eq!(eng.tick(&mut world, DT).unwrap().moving, 1);
        assert!(!world.desired_direction(a).is_zero());
        eng.unregister(&mut world, a).unwrap();
        assert!(world.desired_direction(a).is_zero());
    }

    #[test]
    fn paused_grid_holds_agent() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));
        world.set_paused(g, true);

        for _ in 0..3 {
            assert_eq!(eng.tick(&mut world, DT).unwrap().pending, 1);
        }
        assert!(eng.is_registered(a));
        assert!(world.desired_direction(a).is_zero());
        assert_eq!(eng.pathfinder.submitted(), 0);
    }

    #[test]
    fn unusable_agent_reports_no_path() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let gone = world.spawn(g, Vec2::new(0.5, 0.5));
        let frozen = world.spawn(g, Vec2::new(0.5, 1.5));
        let lost = world.spawn(GridId(7), Vec2::new(0.5, 2.5));
        for id in [gone, frozen, lost] {
            eng.register(id, point(g, 8.5, 0.5));
        }
        world.despawn(gone);
        if let Some(e) = world.entity_mut(frozen) {
            e.can_move = false;
        }

        let summary = eng.tick(&mut world, DT).unwrap();
        assert_eq!(summary.no_path, 3);
        assert!(eng.is_empty());
    }

    #[test]
    fn vanished_or_foreign_target_reports_no_path() {
        let (mut world, g) = world();
        let other_grid = world.add_grid();
        let mut eng = engine(1);
        let target = world.spawn(g, Vec2::new(5.5, 0.5));
        let chaser = world.spawn(g, Vec2::new(0.5, 0.5));
        let tourist = world.spawn(g, Vec2::new(0.5, 1.5));
        eng.register(chaser, SteeringRequest::to_entity(target, 1.0));
        eng.register(tourist, point(other_grid, 0.5, 1.5));
        world.despawn(target);

        let summary = eng.tick(&mut world, DT).unwrap();
        assert_eq!(summary.no_path, 2);
        assert!(eng.is_empty());
    }

    #[test]
    fn obstructed_arrival_waits_for_cooldown() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        world.block_tile(g, TileCoord::new(1, 0));
        eng.register(a, point(g, 2.5, 0.5).arrival_distance(2.5).require_unobstructed(true));

        let summary = eng.tick(&mut world, DT).unwrap();
        assert_eq!(summary.arrived, 0);
        assert!(eng.is_registered(a));
        let cooldown = eng.agent(a).map(|r| r.interaction_cooldown).unwrap_or_default();
        assert!((cooldown - eng.config().interaction_cooldown_secs).abs() < 1e-6);
    }

    #[test]
    fn stall_guard_holds_still_while_cooling_down() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.95, 0.5));
        world.block_tile(g, TileCoord::new(1, 0));
        eng.register(a, point(g, 1.02, 0.5).require_unobstructed(true));

        let summary = eng.tick(&mut world, DT).unwrap();
        assert_eq!(summary.moving, 1);
        assert!(world.desired_direction(a).is_zero());
        assert_eq!(eng.pathfinder.submitted(), 0);
    }

    #[test]
    fn unobstructed_arrival_succeeds() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 2.5, 0.5).arrival_distance(2.5).require_unobstructed(true));
        assert_eq!(eng.tick(&mut world, DT).unwrap().arrived, 1);
    }

    #[test]
    fn stuck_agent_drops_route_and_replans() {
        let (mut world, g) = world();
        let mut eng = engine(1);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));

        let mut rec = Recorder::default();
        eng.tick_observed(&mut world, DT, &mut rec).unwrap();
        eng.pathfinder.pump(4, straight);

        // Never integrate: the agent keeps steering but does not move.
        for _ in 0..60 {
            eng.tick_observed(&mut world, DT, &mut rec).unwrap();
            if !rec.stuck.is_empty() {
                break;
            }
        }
        assert_eq!(rec.stuck, vec![a]);
        assert_eq!(rec.statuses.last(), Some(&(a, SteeringStatus::Pending)));
        assert!(eng.agent(a).is_some_and(|r| !r.waypoints.has_route()));
        assert!(world.desired_direction(a).is_zero());

        eng.tick_observed(&mut world, DT, &mut rec).unwrap();
        assert_eq!(eng.pathfinder.submitted(), 2);
        assert_eq!(rec.requested, vec![a, a]);
    }

    #[test]
    fn disabled_engine_evaluates_nothing() {
        let (mut world, g) = world();
        let mut eng = engine(2);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 0.9, 0.5));
        eng.set_enabled(false);

        let summary = eng.tick(&mut world, DT).unwrap();
        assert_eq!(summary.evaluated, 0);
        assert_eq!(eng.active_bucket(), 0);
        assert!(eng.is_registered(a));

        eng.set_enabled(true);
        assert_eq!(eng.tick(&mut world, DT).unwrap().arrived, 1);
    }

    #[test]
    fn buckets_rotate_each_tick() {
        let (mut world, g) = world();
        let mut eng = engine(2);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        let b = world.spawn(g, Vec2::new(0.5, 1.5));
        eng.register(a, point(g, 8.5, 0.5));
        eng.register(b, point(g, 8.5, 1.5));

        let mut rec = Recorder::default();
        for _ in 0..3 {
            eng.tick_observed(&mut world, DT, &mut rec).unwrap();
        }
        let buckets: Vec<usize> = rec.ends.iter().map(|s| s.bucket).collect();
        assert_eq!(buckets, vec![0, 1, 0]);
        assert_eq!(rec.starts, 3);
        let order: Vec<EntityId> = rec.statuses.iter().map(|&(e, _)| e).collect();
        assert_eq!(order, vec![a, b, a]);
    }

    #[test]
    fn timers_advance_by_bucket_count() {
        let (mut world, g) = world();
        let mut eng = engine(2);
        let a = world.spawn(g, Vec2::new(0.5, 0.5));
        eng.register(a, point(g, 8.5, 0.5));

        eng.tick(&mut world, 0.05).unwrap();
        let cooldown = eng.agent(a).map(|r| r.interaction_cooldown).unwrap_or_default();
        assert!((cooldown + 0.1).abs() < 1e-6);
    }

    #[test]
    fn avoidance_bends_output_around_obstacle() {
        let (mut world, g) = world();
        let a = world.spawn_body(g, Vec2::new(0.5, 0.5), 1, 1);
        world.spawn_body(g, Vec2::new(1.5, 0.5), 1, 1);

        for (avoid, bent) in [(true, true), (false, false)] {
            let mut eng = SteeringEngineBuilder::new(QueuedPathfinder::new())
                .bucket_count(1)
                .collision_avoidance(avoid)
                .build()
                .unwrap();
            eng.register(a, point(g, 8.5, 0.5));
            eng.tick(&mut world, DT).unwrap();
            eng.pathfinder.pump(4, straight);
            eng.tick(&mut world, DT).unwrap();
            eng.tick(&mut world, DT).unwrap();

            let dir = world.desired_direction(a);
            assert!(is_unit_or_zero(dir));
            assert_eq!(dir.y.abs() > 0.1, bent);
            assert!(dir.x > 0.5);
        }
    }

    #[test]
    fn outputs_are_always_unit_or_zero() {
        let (mut world, g) = world();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut eng = engine(2);
        let agents: Vec<EntityId> = (0..12)
            .map(|_| {
                let pos = Vec2::new(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0));
                world.spawn_body(g, pos, 1, 1)
            })
            .collect();
        for &id in &agents {
            let (x, y) = (rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0));
            eng.register(id, point(g, x, y));
        }

        for _ in 0..120 {
            eng.tick(&mut world, DT).unwrap();
            for &id in &agents {
                assert!(is_unit_or_zero(world.desired_direction(id)));
            }
            eng.pathfinder.pump(8, straight);
            world.integrate(DT, 3.0);
        }
    }

    #[test]
    fn config_validation_rejects_zero_buckets() {
        let result = SteeringEngineBuilder::new(QueuedPathfinder::new()).bucket_count(0).build();
        assert!(matches!(result, Err(SteerError::Config(_))));
    }
}
