//! Error types for lattice construction and morphology.

use std::fmt;

/// Errors arising from grid construction or lattice operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// Attempted to construct a grid with zero cells.
    EmptySpace,
    /// The shape is not usable as a lattice.
    InvalidShape {
        /// What went wrong.
        reason: String,
    },
    /// A connectivity order of zero was requested.
    InvalidConnectivity {
        /// The rejected order.
        order: usize,
    },
    /// A flat buffer does not match the grid's cell count.
    ShapeMismatch {
        /// Cell count of the grid.
        expected: usize,
        /// Length of the supplied buffer.
        got: usize,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySpace => write!(f, "space must have at least one cell"),
            Self::InvalidShape { reason } => write!(f, "invalid shape: {reason}"),
            Self::InvalidConnectivity { order } => {
                write!(f, "connectivity must be >= 1, got {order}")
            }
            Self::ShapeMismatch { expected, got } => {
                write!(f, "buffer has {got} cells, grid has {expected}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
