use nestguard_core::NonFiniteVector;

use crate::waypoint::WaypointId;

/// Errors raised by graph construction and path queries.
///
/// An unreachable goal is not an error: queries report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NavError {
    #[error("waypoint {0} is not in the graph")]
    InvalidWaypointReference(WaypointId),

    #[error("invalid waypoint position: {0}")]
    NonFinitePosition(#[from] NonFiniteVector),

    #[error("invalid edge cost {0}")]
    InvalidCost(f32),

    #[error("unknown waypoint name '{0}'")]
    UnknownWaypointName(String),

    #[error("duplicate waypoint name '{0}'")]
    DuplicateWaypointName(String),
}
