//! corridor: agents cross a walled corridor to the far side.
//!
//! A handful of agents spawn on the west end of a small tile map and are
//! steered to random tiles on the east end.  Routes come from a BFS run
//! through `QueuedPathfinder` with a per-tick budget, and the in-memory world
//! integrates the steering output at a fixed speed.
//!
//! ```text
//! cargo run -p corridor -- [config.json]
//! RUST_LOG=st_steering=debug cargo run -p corridor
//! ```
//!
//! Trajectories are written to `output/corridor/trajectories.csv`.

mod map;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use st_core::{EntityId, GridPoint, SteeringConfig, Vec2};
use st_steering::{SteeringEngineBuilder, SteeringObserver, SteeringRequest, SteeringStatus};
use st_world::{EntityView, GridService, MemoryWorld, QueuedPathfinder};

use map::{Corridor, LAYOUT};

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:  usize = 6;
const SEED:         u64   = 42;
const DT:           f32   = 0.05; // seconds per tick
const SPEED:        f32   = 3.0;  // tiles per second
const MAX_TICKS:    u32   = 2_000;
const PATH_BUDGET:  usize = 2;    // searches per tick
const OUTPUT_DIR:   &str  = "output/corridor";

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Stats {
    arrived:  usize,
    no_path:  usize,
    requests: usize,
    stuck:    usize,
}

impl SteeringObserver for Stats {
    fn on_status(&mut self, entity: EntityId, status: SteeringStatus) {
        match status {
            SteeringStatus::Arrived => {
                self.arrived += 1;
                info!(%entity, "arrived");
            }
            SteeringStatus::NoPath => {
                self.no_path += 1;
                warn!(%entity, "gave up: no path");
            }
            _ => {}
        }
    }

    fn on_path_requested(&mut self, _entity: EntityId) {
        self.requests += 1;
    }

    fn on_stuck(&mut self, _entity: EntityId) {
        self.stuck += 1;
    }
}

// ── Output rows ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TrajectoryRow {
    tick:   u32,
    entity: u32,
    x:      f32,
    y:      f32,
    status: &'static str,
}

fn status_label(status: Option<SteeringStatus>) -> &'static str {
    match status {
        Some(SteeringStatus::Pending) => "pending",
        Some(SteeringStatus::Moving)  => "moving",
        Some(SteeringStatus::Arrived) => "arrived",
        Some(SteeringStatus::NoPath)  => "no_path",
        None                          => "done",
    }
}

fn load_config(path: &Path) -> Result<SteeringConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("corridor=info,st_steering=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 1. Configuration.
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => SteeringConfig::default(),
    };
    info!(?config, "configuration");

    // 2. World.
    let corridor = Corridor::from_layout(LAYOUT)?;
    let mut world = MemoryWorld::new();
    let grid = world.add_grid();
    corridor.install(&mut world, grid);

    // 3. Agents: west end → random tiles on the east end.
    let mut rng = SmallRng::seed_from_u64(SEED);
    let starts = corridor.open_tiles_in(1..=2);
    let goals = corridor.open_tiles_in(17..=18);
    let mut engine = SteeringEngineBuilder::new(QueuedPathfinder::new()).config(config).build()?;

    let mut agents: Vec<EntityId> = Vec::with_capacity(AGENT_COUNT);
    for i in 0..AGENT_COUNT {
        let start = world.tile_center(grid, starts[i % starts.len()]);
        let jitter = Vec2::new(rng.gen_range(-0.2..0.2), rng.gen_range(-0.2..0.2));
        let agent = world.spawn_body(grid, start + jitter, 1, 1);

        let goal = goals[rng.gen_range(0..goals.len())];
        let target = GridPoint::new(grid, world.tile_center(grid, goal));
        engine.register(agent, SteeringRequest::to_point(target));
        agents.push(agent);
    }
    info!(agents = agents.len(), "agents registered");

    // 4. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let out_path = Path::new(OUTPUT_DIR).join("trajectories.csv");
    let mut writer = csv::Writer::from_path(&out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;

    // 5. Run.
    let mut stats = Stats::default();
    let t0 = Instant::now();
    let mut ticks = 0;
    while ticks < MAX_TICKS && !engine.is_empty() {
        engine.tick_observed(&mut world, DT, &mut stats)?;
        engine.pathfinder.pump(PATH_BUDGET, |req| corridor.search(req));
        world.integrate(DT, SPEED);

        for &agent in &agents {
            let Some(pos) = world.position(agent) else { continue };
            writer.serialize(TrajectoryRow {
                tick:   ticks,
                entity: agent.0,
                x:      pos.x,
                y:      pos.y,
                status: status_label(engine.status(agent)),
            })?;
        }
        ticks += 1;
    }
    writer.flush()?;

    // 6. Summary.
    info!(
        ticks,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        arrived = stats.arrived,
        no_path = stats.no_path,
        path_requests = stats.requests,
        stuck = stats.stuck,
        still_steering = engine.len(),
        output = %out_path.display(),
        "run complete",
    );
    Ok(())
}
