//! Output side of the engine.

use st_core::{EntityId, Vec2};

/// Receives the steering output.  The motion integrator elsewhere turns the
/// direction into velocity; the engine only ever writes a unit vector or zero.
pub trait Actuator {
    fn set_desired_direction(&mut self, entity: EntityId, direction: Vec2);
}
