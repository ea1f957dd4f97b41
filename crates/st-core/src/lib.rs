//! `st-core`: foundational types for the `rust_steer` steering engine.
//!
//! This crate is a dependency of every other `st-*` crate.  It has no `st-*`
//! dependencies and only `thiserror` (plus optional `serde`) from outside.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `EntityId`, `GridId`                                  |
//! | [`geo`]         | `Vec2`, `TileCoord`, `GridPoint`, octile distance     |
//! | [`config`]      | `SteeringConfig` and its validation                   |
//! | [`error`]       | `SteerError`, `SteerResult`, `PathError`              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                        |
//! |---------|---------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.           |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SteeringConfig;
pub use error::{PathError, SteerError, SteerResult};
pub use geo::{GridPoint, TileCoord, Vec2};
pub use ids::{EntityId, GridId};
