//! Steering engine configuration.
//!
//! Typically built with [`SteeringConfig::default`] and tweaked, or loaded
//! from a JSON/TOML file by the application crate (enable the `serde`
//! feature).  Missing fields fall back to the defaults below.

use crate::{SteerError, SteerResult};

/// Tunables for the steering engine.  All distances are in world units
/// (one tile = one unit), all durations in seconds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SteeringConfig {
    /// Master switch.  When `false`, `tick` evaluates no agents.
    pub enabled: bool,

    /// Whether the collision-avoidance term is blended into the output.
    pub collision_avoidance_enabled: bool,

    /// Number of rotating buckets.  One bucket is evaluated per tick, so each
    /// agent is evaluated every `bucket_count` ticks.
    pub bucket_count: usize,

    /// How close an agent must get to a cached waypoint before advancing.
    pub tile_tolerance: f32,

    /// Delay between two unobstructed-range checks for the same agent.
    pub interaction_cooldown_secs: f32,

    /// Inside this distance of the target the agent stops and waits for the
    /// next interaction check instead of oscillating around it.
    pub stall_distance: f32,

    /// A pathless agent farther than this from its target requests a path.
    pub bootstrap_distance: f32,

    /// With an exhausted route, an agent this close to the target walks
    /// straight at it; farther away it needs a new route.
    pub last_mile_distance: f32,

    /// Movement below this distance from the stuck anchor counts as "not moved".
    pub stuck_slack: f32,

    /// Consecutive evaluations without movement before the route is dropped.
    pub stuck_threshold: u32,

    /// Obstacles farther than this exert no avoidance push.
    pub avoidance_range: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            enabled:                     true,
            collision_avoidance_enabled: true,
            bucket_count:                2,
            tile_tolerance:              0.8,
            interaction_cooldown_secs:   0.25,
            stall_distance:              0.1,
            bootstrap_distance:          1.5,
            last_mile_distance:          2.0,
            stuck_slack:                 1.0,
            stuck_threshold:             30,
            avoidance_range:             2.5,
        }
    }
}

impl SteeringConfig {
    /// Check that every field is usable.
    pub fn validate(&self) -> SteerResult<()> {
        if self.bucket_count == 0 {
            return Err(SteerError::Config("bucket_count must be at least 1".into()));
        }
        if self.stuck_threshold == 0 {
            return Err(SteerError::Config("stuck_threshold must be at least 1".into()));
        }

        let distances = [
            ("tile_tolerance",            self.tile_tolerance),
            ("interaction_cooldown_secs", self.interaction_cooldown_secs),
            ("stall_distance",            self.stall_distance),
            ("bootstrap_distance",        self.bootstrap_distance),
            ("last_mile_distance",        self.last_mile_distance),
            ("stuck_slack",               self.stuck_slack),
            ("avoidance_range",           self.avoidance_range),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(SteerError::Config(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
