//! The `SteeringEngine` struct and its per-agent state machine.

use std::collections::VecDeque;

use st_core::{EntityId, GridId, SteerError, SteerResult, SteeringConfig, Vec2};
use st_world::{Lifecycle, Pathfinder, World};
use tracing::{debug, trace, warn};

use crate::{
    AgentRecord, AgentStore, NoopObserver, SteeringObserver, SteeringRequest, SteeringStatus,
    Target, TickScheduler,
    behavior::{collision_avoidance, seek},
    request::{self, JobPoll},
    trim_route,
};

// ── TickSummary ───────────────────────────────────────────────────────────────

/// Counts of evaluation outcomes for one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The bucket that was evaluated.
    pub bucket:    usize,
    pub evaluated: usize,
    pub pending:   usize,
    pub moving:    usize,
    pub arrived:   usize,
    pub no_path:   usize,
}

impl TickSummary {
    fn record(&mut self, status: SteeringStatus) {
        self.evaluated += 1;
        match status {
            SteeringStatus::Pending => self.pending += 1,
            SteeringStatus::Moving  => self.moving += 1,
            SteeringStatus::Arrived => self.arrived += 1,
            SteeringStatus::NoPath  => self.no_path += 1,
        }
    }
}

// ── SteeringEngine ────────────────────────────────────────────────────────────

/// Steers registered agents toward their targets.
///
/// `SteeringEngine<P>` owns the agent records, the bucket scheduler, and the
/// pathfinder `P`.  The host world is borrowed per call, so the engine never
/// holds references into it.
///
/// Each [`tick`][Self::tick] evaluates one bucket.  An evaluation walks:
///
/// 1. **Preconditions**: agent alive with a mover, valid grid, resolvable
///    target.  Failures report `NoPath`.
/// 2. **Paused grid**: output zeroed, `Pending`.
/// 3. **Cross-grid target**: `NoPath`.
/// 4. **Arrival**: within `arrival_distance` once the interaction cooldown
///    has elapsed (and, if required, with an unobstructed line) → `Arrived`.
/// 5. **Stall**: inside `stall_distance` while cooling down → zero, `Moving`.
/// 6. **Job resolution**: a finished job either installs a trimmed route
///    (`Pending`) or ends the agent (`NoPath`); a genuine fault is returned
///    as an error.
/// 7. **Bootstrap**: pathless and far away → request a route, `Pending`.
/// 8. **Re-plan** when an entity target has drifted.
/// 9. **Stuck**: no progress for `stuck_threshold` evaluations → drop the
///    route, `Pending`.
/// 10. **Steer**: resolve the next waypoint, check traversability, blend
///     seek with avoidance, and write the normalized direction → `Moving`.
///
/// Agents that report `Arrived` or `NoPath` are unregistered at the end of
/// their evaluation.
pub struct SteeringEngine<P: Pathfinder> {
    /// The pathfinder jobs are submitted to.  Public so the host can drive
    /// it (e.g. [`QueuedPathfinder::pump`][st_world::QueuedPathfinder::pump]).
    pub pathfinder: P,

    config:    SteeringConfig,
    agents:    AgentStore,
    scheduler: TickScheduler,
}

impl<P: Pathfinder> SteeringEngine<P> {
    /// An engine with [`SteeringConfig::default`].  Use
    /// [`SteeringEngineBuilder`][crate::SteeringEngineBuilder] for anything else.
    pub fn new(pathfinder: P) -> Self {
        Self::with_config(pathfinder, SteeringConfig::default())
    }

    /// Build without validating `config`; the builder validates first.
    pub(crate) fn with_config(pathfinder: P, config: SteeringConfig) -> Self {
        Self {
            scheduler: TickScheduler::new(config.bucket_count),
            agents: AgentStore::new(),
            pathfinder,
            config,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    /// Turn the whole engine on or off.  While off, `tick` evaluates nothing
    /// and the active bucket does not rotate.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn set_collision_avoidance(&mut self, enabled: bool) {
        self.config.collision_avoidance_enabled = enabled;
    }

    pub fn is_registered(&self, entity: EntityId) -> bool {
        self.agents.contains(entity)
    }

    /// Status from the agent's most recent evaluation (`Pending` before the
    /// first one).
    pub fn status(&self, entity: EntityId) -> Option<SteeringStatus> {
        self.agents.get(entity).map(|r| r.status)
    }

    pub fn agent(&self, entity: EntityId) -> Option<&AgentRecord> {
        self.agents.get(entity)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of agents in each bucket.
    pub fn bucket_sizes(&self) -> &[usize] {
        self.scheduler.sizes()
    }

    /// The bucket the next tick will evaluate.
    pub fn active_bucket(&self) -> usize {
        self.scheduler.active()
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Start steering `entity`.  The agent joins the least-loaded bucket.
    ///
    /// # Panics
    ///
    /// If `entity` is already registered.
    pub fn register(&mut self, entity: EntityId, request: SteeringRequest) {
        assert!(!self.agents.contains(entity), "{entity} is already registered for steering");
        let bucket = self.scheduler.least_loaded();
        self.scheduler.add(bucket);
        self.agents.insert(AgentRecord::new(entity, request, bucket));
        debug!(entity = %entity, bucket, "agent registered");
    }

    /// Stop steering `entity`: drop its records, cancel any outstanding path
    /// job, and zero its output.
    ///
    /// The records are removed even when an error is returned.  The error
    /// reports a path job that had already finished with a genuine fault.
    pub fn unregister<W: World + ?Sized>(&mut self, world: &mut W, entity: EntityId) -> SteerResult<()> {
        let record = self.agents.remove(entity).ok_or(SteerError::NotRegistered(entity))?;
        self.scheduler.remove(record.bucket);
        stop(world, entity);
        debug!(entity = %entity, status = ?record.status, "agent unregistered");

        match record.job {
            Some(job) => job.cancel().map_err(|source| {
                warn!(entity = %entity, error = %source, "path job faulted before unregister");
                SteerError::PathJob { entity, source }
            }),
            None => Ok(()),
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Evaluate the active bucket.  `elapsed` is the time since the previous
    /// tick.
    pub fn tick<W: World + ?Sized>(&mut self, world: &mut W, elapsed: f32) -> SteerResult<TickSummary> {
        self.tick_observed(world, elapsed, &mut NoopObserver)
    }

    /// [`tick`][Self::tick] with observer callbacks.
    ///
    /// A genuine pathfinding fault aborts the tick: the error is returned,
    /// the remaining agents in the bucket are not evaluated, and the bucket
    /// does not rotate.
    pub fn tick_observed<W, O>(
        &mut self,
        world:    &mut W,
        elapsed:  f32,
        observer: &mut O,
    ) -> SteerResult<TickSummary>
    where
        W: World + ?Sized,
        O: SteeringObserver,
    {
        let bucket = self.scheduler.active();
        let mut summary = TickSummary { bucket, ..TickSummary::default() };
        if !self.config.enabled {
            return Ok(summary);
        }

        observer.on_tick_start(bucket);
        let dt = self.scheduler.effective_elapsed(elapsed);

        for entity in self.agents.bucket_members(bucket) {
            let status = self.evaluate(world, entity, dt, observer)?;
            if let Some(record) = self.agents.get_mut(entity) {
                record.status = status;
            }
            summary.record(status);
            observer.on_status(entity, status);
            trace!(entity = %entity, ?status, "agent evaluated");

            if status.is_terminal() {
                self.unregister(world, entity)?;
            }
        }

        self.scheduler.advance();
        observer.on_tick_end(&summary);
        Ok(summary)
    }

    // ── Per-agent evaluation ──────────────────────────────────────────────

    fn evaluate<W, O>(
        &mut self,
        world:    &mut W,
        entity:   EntityId,
        dt:       f32,
        observer: &mut O,
    ) -> SteerResult<SteeringStatus>
    where
        W: World + ?Sized,
        O: SteeringObserver,
    {
        let Self { config, pathfinder, agents, .. } = self;
        let record = agents.get_mut(entity).ok_or(SteerError::NotRegistered(entity))?;

        // ── 1. Preconditions ──────────────────────────────────────────────
        let Some((grid, pos, target_grid, target_pos)) = locate(&*world, entity, &record.request.target)
        else {
            stop(world, entity);
            return Ok(SteeringStatus::NoPath);
        };

        // ── 2. Paused grid ────────────────────────────────────────────────
        if world.is_paused(grid) {
            stop(world, entity);
            return Ok(SteeringStatus::Pending);
        }

        // ── 3. Cross-grid target ──────────────────────────────────────────
        if target_grid != grid {
            stop(world, entity);
            return Ok(SteeringStatus::NoPath);
        }

        // ── 4. Arrival ────────────────────────────────────────────────────
        let distance = pos.distance(target_pos);
        let arrival_distance = record.request.arrival_distance;
        record.interaction_cooldown -= dt;
        if distance <= arrival_distance && record.interaction_cooldown <= 0.0 {
            if !record.request.requires_unobstructed
                || world.in_range_unobstructed(entity, target_pos, arrival_distance)
            {
                stop(world, entity);
                return Ok(SteeringStatus::Arrived);
            }
            record.interaction_cooldown = config.interaction_cooldown_secs;
        }

        // ── 5. Stall ──────────────────────────────────────────────────────
        if record.interaction_cooldown > 0.0 && distance <= config.stall_distance {
            stop(world, entity);
            return Ok(SteeringStatus::Moving);
        }

        // ── 6. Job resolution ─────────────────────────────────────────────
        let poll = record.job.as_ref().map(|job| job.poll());
        match poll {
            None | Some(JobPoll::Outstanding) => {}
            Some(JobPoll::Cancelled) => {
                record.job = None;
                stop(world, entity);
                return Ok(SteeringStatus::NoPath);
            }
            Some(JobPoll::Fault(source)) => {
                record.job = None;
                warn!(entity = %entity, error = %source, "path job faulted");
                return Err(SteerError::PathJob { entity, source });
            }
            Some(JobPoll::Route(route)) => {
                record.job = None;
                if route.is_empty() {
                    debug!(entity = %entity, "pathfinder returned an empty route");
                    stop(world, entity);
                    return Ok(SteeringStatus::NoPath);
                }
                let tile = world.tile_at(grid, pos);
                let route = trim_route(tile, VecDeque::from(route));
                debug!(entity = %entity, waypoints = route.len(), "route accepted");
                record.waypoints.set_route(route);
                if record.request.target.entity().is_some() {
                    record.target_anchor = Some(target_pos);
                }
                return Ok(SteeringStatus::Pending);
            }
        }

        // ── 7. Bootstrap ──────────────────────────────────────────────────
        if !record.waypoints.has_route() && distance > config.bootstrap_distance {
            stop(world, entity);
            if record.job.is_none() {
                record.job = Some(request::submit(
                    &*world,
                    pathfinder,
                    entity,
                    grid,
                    pos,
                    target_pos,
                    record.request.pathfinding_proximity,
                ));
                observer.on_path_requested(entity);
            }
            return Ok(SteeringStatus::Pending);
        }

        // ── 8. Re-plan for a drifting entity target ───────────────────────
        let mut ignored: Vec<EntityId> = Vec::new();
        if let Target::Entity { entity: target, max_drift } = record.request.target {
            ignored.push(target);
            let drifted = record.target_anchor.is_some_and(|anchor| anchor.distance(target_pos) >= max_drift);
            if drifted && record.job.is_none() {
                record.job = Some(request::submit(
                    &*world,
                    pathfinder,
                    entity,
                    grid,
                    pos,
                    target_pos,
                    record.request.pathfinding_proximity,
                ));
                observer.on_path_requested(entity);
            }
        }

        // ── 9. Stuck detection ────────────────────────────────────────────
        if record.stuck.observe(pos, config.stuck_slack, config.stuck_threshold) {
            debug!(entity = %entity, %pos, "agent stuck; dropping route");
            record.waypoints.clear();
            observer.on_stuck(entity);
            stop(world, entity);
            return Ok(SteeringStatus::Pending);
        }

        // ── 10. Steer ─────────────────────────────────────────────────────
        let next = record.waypoints.resolve(
            &*world,
            grid,
            pos,
            target_pos,
            config.last_mile_distance,
            config.tile_tolerance,
        );
        let Some(next) = next.filter(|&p| world.can_traverse(entity, grid, p)) else {
            stop(world, entity);
            return Ok(SteeringStatus::NoPath);
        };

        let mut direction = seek(pos, next);
        if config.collision_avoidance_enabled {
            let avoidance = collision_avoidance(
                &*world,
                entity,
                grid,
                pos,
                direction,
                &ignored,
                config.avoidance_range,
            );
            direction += avoidance.vector;
            record.waypoints.skip_avoided(&avoidance.avoided);
        }
        world.set_desired_direction(entity, direction.normalize_or_zero());
        Ok(SteeringStatus::Moving)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Zero the agent's output if it still has a mover.
fn stop<W: World + ?Sized>(world: &mut W, entity: EntityId) {
    if world.has_mover(entity) {
        world.set_desired_direction(entity, Vec2::ZERO);
    }
}

/// Resolve the agent's grid and position and the target's, or `None` if
/// any precondition fails.
fn locate<W: World + ?Sized>(
    world:  &W,
    entity: EntityId,
    target: &Target,
) -> Option<(GridId, Vec2, GridId, Vec2)> {
    if world.lifecycle(entity) == Lifecycle::Deleted
        || !world.has_mover(entity)
        || !world.can_move(entity)
    {
        return None;
    }
    let grid = world.grid_of(entity).filter(|&g| world.is_valid(g))?;
    let pos = world.position(entity)?;

    let (target_grid, target_pos) = match *target {
        Target::Point(point) => (point.grid, point.pos),
        Target::Entity { entity: other, .. } => {
            if world.lifecycle(other) >= Lifecycle::Deleting {
                return None;
            }
            (world.grid_of(other)?, world.position(other)?)
        }
    };
    Some((grid, pos, target_grid, target_pos))
}
