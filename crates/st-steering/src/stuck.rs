//! Stuck detection.

use st_core::Vec2;

/// Counts consecutive evaluations in which an agent stayed within `slack` of
/// an anchor position.
#[derive(Clone, Debug, Default)]
pub struct StuckTracker {
    anchor:  Option<Vec2>,
    counter: u32,
}

impl StuckTracker {
    /// Record the agent at `pos`.  Returns `true` when the agent has now been
    /// stationary for `threshold` evaluations; the counter restarts after
    /// firing.
    pub fn observe(&mut self, pos: Vec2, slack: f32, threshold: u32) -> bool {
        match self.anchor {
            Some(anchor) if anchor.distance(pos) <= slack => {
                self.counter += 1;
                if self.counter >= threshold {
                    self.counter = 0;
                    return true;
                }
                false
            }
            _ => {
                self.anchor = Some(pos);
                self.counter = 0;
                false
            }
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }
}
