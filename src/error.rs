//! Error type shared by fog surface construction and recoloring.

use crate::fog::PositionKey;

/// Failures reported by [`FogSurface`](crate::fog::FogSurface) and
/// [`FogConfig::validate`](crate::fog::FogConfig::validate).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FogError {
    /// A configuration value would produce degenerate geometry.
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field, e.g. `lattice.radius`.
        field: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
    /// No quadrant mesh holds a vertex at this rounded position.
    #[error("no indexed vertex at {0}")]
    UnknownPosition(PositionKey),
    /// The vertex handle is outside the enumeration of indexed positions.
    #[error("vertex handle {0} is not indexed")]
    UnknownHandle(usize),
    /// The global triangle index was never assigned to a quadrant.
    #[error("triangle {0} is not assigned to any quadrant")]
    UnknownTriangle(usize),
}
