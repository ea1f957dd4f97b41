//! `st-steering`: the per-tick steering engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                          |
//! |---------------|-------------------------------------------------------------------|
//! | [`agent`]     | `Target`, `SteeringRequest`, `SteeringStatus`                     |
//! | [`store`]     | `AgentRecord`, `AgentStore`: arena + dense entity index           |
//! | [`scheduler`] | `TickScheduler`: rotating load-balanced buckets                   |
//! | [`waypoint`]  | `trim_route`, `WaypointCache`: route consumption                  |
//! | [`stuck`]     | `StuckTracker`                                                    |
//! | [`request`]   | path job submission, polling, and cancellation                    |
//! | [`behavior`]  | `seek`, `arrival`, `pursuit`, `collision_avoidance`               |
//! | [`engine`]    | `SteeringEngine<P>`: state machine and public API                 |
//! | [`builder`]   | `SteeringEngineBuilder<P>`                                        |
//! | [`observer`]  | `SteeringObserver` hooks, `NoopObserver`                          |
//!
//! # Tick model
//!
//! ```text
//! tick(world, elapsed):
//!   ① pick the active bucket (one of N)
//!   ② evaluate every agent in it with elapsed * N
//!        preconditions → arrival → job resolution → re-plan
//!        → stuck check → next waypoint → seek + avoidance → actuator
//!   ③ unregister agents that reported Arrived or NoPath
//!   ④ advance the active bucket
//! ```
//!
//! Agents outside the active bucket keep moving along the last direction
//! written for them.
//!
//! # Quick-start
//!
//! ```rust
//! use st_core::{GridPoint, Vec2};
//! use st_steering::{SteeringEngine, SteeringRequest};
//! use st_world::{MemoryWorld, QueuedPathfinder};
//!
//! let mut world = MemoryWorld::new();
//! let grid = world.add_grid();
//! let agent = world.spawn(grid, Vec2::new(0.5, 0.5));
//!
//! let mut engine = SteeringEngine::new(QueuedPathfinder::new());
//! engine.register(agent, SteeringRequest::to_point(GridPoint::new(grid, Vec2::new(0.9, 0.5))));
//!
//! let summary = engine.tick(&mut world, 0.05).unwrap();
//! assert_eq!(summary.arrived, 1);
//! assert!(!engine.is_registered(agent));
//! ```

pub mod agent;
pub mod behavior;
pub mod builder;
pub mod engine;
pub mod observer;
pub mod request;
pub mod scheduler;
pub mod store;
pub mod stuck;
pub mod waypoint;

#[cfg(test)]
mod tests;

pub use agent::{SteeringRequest, SteeringStatus, Target};
pub use builder::SteeringEngineBuilder;
pub use engine::{SteeringEngine, TickSummary};
pub use observer::{NoopObserver, SteeringObserver};
pub use scheduler::TickScheduler;
pub use store::{AgentRecord, AgentStore};
pub use stuck::StuckTracker;
pub use waypoint::{WaypointCache, trim_route};
