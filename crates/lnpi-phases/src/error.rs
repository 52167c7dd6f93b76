//! Error type for phase assembly.

use std::error::Error;
use std::fmt;

use lnpi_core::FieldError;
use lnpi_segment::SegmentError;

/// Errors from building or analysing phases.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseError {
    /// The creator or a request is misconfigured.
    Configuration {
        /// What is missing or invalid.
        reason: String,
    },
    /// Segmentation, barrier estimation or merging failed.
    Segment(SegmentError),
    /// The tag function returned the wrong number of tags.
    TagCount {
        /// Number of phases tagged.
        expected: usize,
        /// Number of tags returned.
        got: usize,
    },
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => write!(f, "phase creator configuration: {reason}"),
            Self::Segment(e) => write!(f, "segmentation failed: {e}"),
            Self::TagCount { expected, got } => {
                write!(f, "tag function returned {got} tags for {expected} phases")
            }
        }
    }
}

impl Error for PhaseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Segment(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SegmentError> for PhaseError {
    fn from(e: SegmentError) -> Self {
        Self::Segment(e)
    }
}

impl From<FieldError> for PhaseError {
    fn from(e: FieldError) -> Self {
        Self::Segment(e.into())
    }
}
