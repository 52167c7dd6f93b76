//! Segmentation of lnPi landscapes into phase regions.
//!
//! The pipeline, each stage usable on its own:
//!
//! 1. [`find_peaks_adaptive`]: local maxima at adaptively widened spacing.
//! 2. [`watershed`] / [`Segmenter`]: flood the negated landscape from the
//!    peaks into a label map.
//! 3. [`FreeEnergy`]: free-energy minima of each region and the barriers
//!    between adjacent regions.
//! 4. [`FreeEnergy::merge_regions`]: greedily merge regions separated by
//!    low barriers until the requested count and threshold are met.
//!
//! Non-fatal conditions are logged through `tracing` and returned as
//! [`SegmentWarning`]s. Nothing here installs a subscriber.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod disjoint;
pub mod error;
pub mod free_energy;
mod grid_helpers;
pub mod labels;
pub mod merge;
pub mod peaks;
pub mod segmenter;
pub mod watershed;

pub use config::{
    LabelsToMasks, MergeConfig, MergeOverrides, OverflowPolicy, PeakConfig, PeakOverrides,
    WatershedConfig, DEFAULT_MIN_DISTANCE,
};
pub use disjoint::RegionForest;
pub use error::{SegmentError, SegmentWarning};
pub use free_energy::FreeEnergy;
pub use labels::{labels_to_masks, unique_features, RegionMasks};
pub use merge::MergeOutcome;
pub use peaks::{find_peaks_adaptive, strongest_peaks, Peaks};
pub use segmenter::{SegmentRequest, Segmentation, Segmenter};
pub use watershed::{watershed, Markers};
