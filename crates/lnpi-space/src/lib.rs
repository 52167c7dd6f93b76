//! Lattice topology for lnPi segmentation.
//!
//! This crate defines the n-dimensional [`Grid`] on which lnPi landscapes
//! live, the [`Neighbourhood`] induced by a [`Connectivity`] order, and the
//! flat-buffer primitives the segmentation stages are built from:
//!
//! - [`find_boundaries`]: thick and outer region boundaries
//! - [`grey_max_filter`]: windowed maximum used by peak detection
//! - [`label`]: connected-component labeling
//!
//! All buffers are flat slices in row-major (canonical) order, indexed by
//! the rank returned from [`Grid::rank_of`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod connectivity;
pub mod error;
pub mod grid;
pub mod label;
pub mod morphology;

#[cfg(test)]
pub(crate) mod compliance;

pub use connectivity::{Connectivity, Neighbourhood};
pub use error::SpaceError;
pub use grid::Grid;
pub use label::label;
pub use morphology::{find_boundaries, grey_max_filter, BoundaryMode};
