//! Identifier aliases and the [`Coord`] type.

use smallvec::SmallVec;

/// Region label stored in a [`LabelMap`](crate::LabelMap).
///
/// `0` is background / unlabeled; positive values identify regions.
pub type Label = u32;

/// Tag assigned to a phase by an external classifier.
pub type PhaseTag = i64;

/// A coordinate on an n-dimensional lattice.
///
/// Uses `SmallVec<[usize; 4]>` to avoid heap allocation for landscapes
/// up to 4 dimensions (one axis per species in the macrostate).
/// Higher-dimensional landscapes spill to the heap transparently.
pub type Coord = SmallVec<[usize; 4]>;
