//! Fluent builder for constructing a [`SteeringEngine`].

use st_core::{SteerResult, SteeringConfig};
use st_world::Pathfinder;
use tracing::info;

use crate::SteeringEngine;

/// Fluent builder for [`SteeringEngine<P>`].
///
/// | Method                     | Default                      |
/// |----------------------------|------------------------------|
/// | `.config(c)`               | `SteeringConfig::default()`  |
/// | `.bucket_count(n)`         | `2`                          |
/// | `.collision_avoidance(b)`  | `true`                       |
///
/// # Example
///
/// ```rust
/// use st_steering::SteeringEngineBuilder;
/// use st_world::QueuedPathfinder;
///
/// let engine = SteeringEngineBuilder::new(QueuedPathfinder::new())
///     .bucket_count(4)
///     .build()
///     .unwrap();
/// assert_eq!(engine.bucket_sizes(), &[0, 0, 0, 0]);
/// ```
pub struct SteeringEngineBuilder<P: Pathfinder> {
    config:     SteeringConfig,
    pathfinder: P,
}

impl<P: Pathfinder> SteeringEngineBuilder<P> {
    pub fn new(pathfinder: P) -> Self {
        Self { config: SteeringConfig::default(), pathfinder }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SteeringConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bucket_count(mut self, n: usize) -> Self {
        self.config.bucket_count = n;
        self
    }

    pub fn collision_avoidance(mut self, enabled: bool) -> Self {
        self.config.collision_avoidance_enabled = enabled;
        self
    }

    /// Validate the configuration and build the engine.
    pub fn build(self) -> SteerResult<SteeringEngine<P>> {
        self.config.validate()?;
        info!(
            buckets = self.config.bucket_count,
            avoidance = self.config.collision_avoidance_enabled,
            "steering engine ready",
        );
        Ok(SteeringEngine::with_config(self.pathfinder, self.config))
    }
}
