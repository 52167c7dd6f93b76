//! lnpi: phase segmentation of lnPi free-energy landscapes.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all lnpi sub-crates. For most users, adding `lnpi` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use lnpi::prelude::*;
//!
//! // Two equal maxima split by a dip one unit deep.
//! let field = Field::from_vec(vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]).unwrap();
//!
//! let seg = Segmenter::default()
//!     .segment(&field, &SegmentRequest::default())
//!     .unwrap();
//! assert_eq!(seg.seeds, 2);
//!
//! let fe = FreeEnergy::from_labels(&field, &seg.labels, &LabelsToMasks::default()).unwrap();
//! assert_eq!(fe.delta_w()[[0, 1]], 1.0);
//!
//! let merged = fe
//!     .merge_regions(&MergeConfig {
//!         merge_threshold: 0.5,
//!         ..Default::default()
//!     })
//!     .unwrap();
//! assert_eq!(merged.len(), 2);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `lnpi-core` | `Field`, masks, label maps, the `LnPi` trait |
//! | [`space`] | `lnpi-space` | Grids, connectivity, morphology, labeling |
//! | [`segment`] | `lnpi-segment` | Peaks, watershed, barriers, region merging |
//! | [`phases`] | `lnpi-phases` | Phase creator, tagged phase sets, lnz scans |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`lnpi-core`).
///
/// Contains the [`types::Field`] landscape, mask conventions and the
/// [`types::LnPi`] collaborator trait.
pub use lnpi_core as types;

/// Lattice topology and morphology (`lnpi-space`).
pub use lnpi_space as space;

/// Segmentation stages (`lnpi-segment`).
///
/// [`segment::find_peaks_adaptive`], [`segment::watershed`],
/// [`segment::FreeEnergy`] and [`segment::FreeEnergy::merge_regions`].
pub use lnpi_segment as segment;

/// Phase assembly (`lnpi-phases`).
///
/// [`phases::PhaseCreator`] turns a reference lnPi into a
/// [`phases::PhaseSet`].
pub use lnpi_phases as phases;

/// Common imports for typical lnpi usage.
///
/// ```rust
/// use lnpi::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use lnpi_core::{Field, Label, LabelMap, LnPi, Mask, MaskConvention, PhaseTag};

    // Errors
    pub use lnpi_core::FieldError;
    pub use lnpi_phases::PhaseError;
    pub use lnpi_segment::{SegmentError, SegmentWarning};
    pub use lnpi_space::SpaceError;

    // Space
    pub use lnpi_space::{Connectivity, Grid};

    // Segmentation
    pub use lnpi_segment::{
        find_peaks_adaptive, watershed, FreeEnergy, LabelsToMasks, MergeConfig, MergeOutcome,
        OverflowPolicy, PeakConfig, Peaks, SegmentRequest, Segmentation, Segmenter,
    };

    // Phases
    pub use lnpi_phases::{BuildRequest, PhaseCreator, PhaseScan, PhaseSet, ScanAxis};
}
