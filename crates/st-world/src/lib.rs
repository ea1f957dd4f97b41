//! `st-world`: everything the steering engine consumes from the host
//! simulation.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                       |
//! |----------------|----------------------------------------------------------------|
//! | [`entity`]     | `EntityView` trait, `Lifecycle`                                |
//! | [`grid`]       | `GridService`, `TraversalOracle`, `Occupant`                   |
//! | [`actuator`]   | `Actuator`: where the desired direction is written             |
//! | [`job`]        | `CancelToken`, `JobHandle`, `JobStatus`, `Route`               |
//! | [`pathfinder`] | `Pathfinder` trait, `PathRequest`, `QueuedPathfinder`          |
//! | [`memory`]     | `MemoryWorld`: in-memory implementation of every world trait   |
//!
//! # Pluggability
//!
//! The engine in `st-steering` is written against these traits only, so a
//! host can back them with its own entity store, tile map, and physics.  The
//! [`World`] alias bundles the four read/write traits the engine borrows
//! each tick; the [`Pathfinder`] is owned by the engine.

pub mod actuator;
pub mod entity;
pub mod grid;
pub mod job;
pub mod memory;
pub mod pathfinder;


pub use actuator::Actuator;
pub use entity::{EntityView, Lifecycle};
pub use grid::{GridService, Occupant, TraversalOracle};
pub use job::{CancelToken, JobHandle, JobStatus, Route};
pub use memory::{MemoryEntity, MemoryWorld};
pub use pathfinder::{PathRequest, Pathfinder, QueuedPathfinder};
pub use st_core::PathError;

/// Everything the engine borrows from the host during one tick.
///
/// Blanket-implemented for any type providing all four traits.
pub trait World: EntityView + GridService + TraversalOracle + Actuator {}

impl<T: ?Sized> World for T where T: EntityView + GridService + TraversalOracle + Actuator {}
