//! Engine error types.
//!
//! [`PathError`] is the fault a pathfinding job finishes with; it lives here
//! rather than in `st-world` so that [`SteerError`] can carry it as a source.

use thiserror::Error;

use crate::EntityId;

/// Why a pathfinding job finished without a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The job observed its cancellation token.  Expected; never fatal.
    #[error("pathfinding job was cancelled")]
    Cancelled,

    #[error("start tile is not on a valid grid")]
    NoStart,

    #[error("end tile is not on a valid grid")]
    NoEnd,

    /// Any other failure inside the external pathfinder.
    #[error("pathfinder failed: {0}")]
    Failed(String),
}

impl PathError {
    #[inline]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PathError::Cancelled)
    }
}

/// The top-level error type for `st-*` crates.
#[derive(Debug, Error)]
pub enum SteerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("entity {0} is not registered for steering")]
    NotRegistered(EntityId),

    /// A pathfinding job for `entity` faulted with something other than
    /// cancellation.  Treated as fatal and handed back to the caller.
    #[error("pathfinding job for {entity} faulted: {source}")]
    PathJob {
        entity: EntityId,
        #[source]
        source: PathError,
    },
}

/// Shorthand result type for all `st-*` crates.
pub type SteerResult<T> = Result<T, SteerError>;
