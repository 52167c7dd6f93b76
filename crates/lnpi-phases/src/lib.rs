//! Phase assembly from segmented lnPi landscapes.
//!
//! A [`PhaseCreator`] holds a reference lnPi and the segmentation
//! settings. Each build optionally reweights the reference, segments the
//! landscape, merges regions separated by low barriers and returns one
//! masked lnPi per phase in a [`PhaseSet`]. A tag function can label the
//! phases; phases sharing a tag are unioned.
//!
//! [`PhaseScan`] repeats builds along one lnz component.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collection;
pub mod config;
pub mod creator;
pub mod error;
pub mod scan;

pub use collection::PhaseSet;
pub use config::{BuildRequest, PhaseCreatorConfig};
pub use creator::{PhaseCreator, PhaseCreatorBuilder, TagFn};
pub use error::PhaseError;
pub use scan::{PhaseScan, ScanAxis};
