//! Error types for field construction and mask handling.

use std::error::Error;
use std::fmt;

/// Errors from constructing fields or converting masks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// Two arrays that must share a shape do not.
    ShapeMismatch {
        /// Shape of the reference array (usually the field data).
        expected: Vec<usize>,
        /// Shape that was supplied.
        got: Vec<usize>,
    },
    /// A mask convention name was not recognised.
    UnknownConvention {
        /// The rejected name.
        name: String,
    },
    /// The field has no cells.
    EmptyField,
    /// An operation over a mask list received no masks.
    NoMasks,
    /// A feature list does not match the number of masks.
    FeatureCount {
        /// Number of masks supplied.
        masks: usize,
        /// Number of features supplied.
        features: usize,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected:?}, got {got:?}")
            }
            Self::UnknownConvention { name } => {
                write!(f, "unknown mask convention '{name}' (expected 'image' or 'masked')")
            }
            Self::EmptyField => write!(f, "field must have at least one cell"),
            Self::NoMasks => write!(f, "at least one mask is required"),
            Self::FeatureCount { masks, features } => {
                write!(f, "{features} features supplied for {masks} masks")
            }
        }
    }
}

impl Error for FieldError {}
