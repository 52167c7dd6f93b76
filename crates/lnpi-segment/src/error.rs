//! Error and warning types for the segmentation pipeline.

use std::error::Error;
use std::fmt;

use lnpi_core::FieldError;
use lnpi_space::SpaceError;

/// Errors from peak finding, watershed, barrier estimation or merging.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentError {
    /// More peaks were found than allowed under [`OverflowPolicy::Raise`].
    ///
    /// [`OverflowPolicy::Raise`]: crate::config::OverflowPolicy::Raise
    CountExceeded {
        /// Peaks found at the last radius tried.
        found: usize,
        /// The configured cap.
        max: usize,
    },
    /// A region mask selects no cells.
    EmptyRegion {
        /// Position of the offending mask in the input list.
        index: usize,
    },
    /// A mask or label map does not match the field's shape.
    ShapeMismatch {
        /// Shape of the field.
        expected: Vec<usize>,
        /// Shape that was supplied.
        got: Vec<usize>,
    },
    /// Segmentation produced no regions at all.
    NoRegions,
    /// A region index is out of range.
    RegionIndex {
        /// The requested index.
        index: usize,
        /// Number of regions available.
        count: usize,
    },
    /// A configuration value is invalid.
    InvalidConfig {
        /// What is wrong with it.
        reason: String,
    },
    /// A peak overflow policy name was not recognised.
    UnknownOverflowPolicy {
        /// The rejected name.
        name: String,
    },
    /// Lattice construction or traversal failed.
    Space(SpaceError),
    /// Field or mask handling failed.
    Field(FieldError),
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountExceeded { found, max } => {
                write!(f, "found {found} peaks, more than the allowed {max}")
            }
            Self::EmptyRegion { index } => write!(f, "region mask {index} is empty"),
            Self::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected:?}, got {got:?}")
            }
            Self::NoRegions => write!(f, "segmentation produced no regions"),
            Self::RegionIndex { index, count } => {
                write!(f, "region index {index} out of range for {count} regions")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
            Self::UnknownOverflowPolicy { name } => write!(
                f,
                "unknown overflow policy '{name}' (expected 'ignore', 'warn' or 'raise')"
            ),
            Self::Space(e) => write!(f, "lattice error: {e}"),
            Self::Field(e) => write!(f, "field error: {e}"),
        }
    }
}

impl Error for SegmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpaceError> for SegmentError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<FieldError> for SegmentError {
    fn from(e: FieldError) -> Self {
        match e {
            FieldError::ShapeMismatch { expected, got } => Self::ShapeMismatch { expected, got },
            other => Self::Field(other),
        }
    }
}

/// A non-fatal condition observed while segmenting.
///
/// Warnings are logged through `tracing` when they occur and also returned
/// on the stage's result so callers can inspect them.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentWarning {
    /// More peaks than `max_peaks` remained at the largest radius.
    PeakOverflow {
        /// Peaks found.
        found: usize,
        /// The configured cap.
        max: usize,
    },
    /// Merging stopped above the threshold with more regions than requested.
    MergeIncomplete {
        /// Regions left after merging.
        remaining: usize,
        /// Requested maximum.
        max: usize,
        /// Smallest merge cost that was refused.
        min_cost: f64,
    },
}

impl fmt::Display for SegmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeakOverflow { found, max } => {
                write!(f, "{found} peaks found at the largest radius, max is {max}")
            }
            Self::MergeIncomplete {
                remaining,
                max,
                min_cost,
            } => write!(
                f,
                "{remaining} regions remain above merge threshold (max {max}, cheapest merge {min_cost})"
            ),
        }
    }
}
