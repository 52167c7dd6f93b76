//! [`PhaseSet`]: assembled phases with their tags.

use lnpi_core::{Field, LnPi, Mask, MaskConvention, PhaseTag};
use lnpi_segment::{FreeEnergy, SegmentError, SegmentWarning};
use lnpi_space::Connectivity;

use crate::error::PhaseError;

/// Phases built from one reference lnPi, each with a tag.
///
/// Without a tag function the tags are the phase positions `0, 1, ...`.
/// Non-fatal conditions met while building the set are kept in
/// [`warnings`](PhaseSet::warnings).
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseSet<T> {
    items: Vec<T>,
    index: Vec<PhaseTag>,
    warnings: Vec<SegmentWarning>,
}

impl<T> PhaseSet<T> {
    /// Pair `items` with `index`.
    ///
    /// # Errors
    ///
    /// [`PhaseError::TagCount`] if the lengths differ.
    pub fn new(items: Vec<T>, index: Vec<PhaseTag>) -> Result<Self, PhaseError> {
        if items.len() != index.len() {
            return Err(PhaseError::TagCount {
                expected: items.len(),
                got: index.len(),
            });
        }
        Ok(Self {
            items,
            index,
            warnings: Vec::new(),
        })
    }

    /// Tag each item with its position.
    pub fn positional(items: Vec<T>) -> Self {
        let index = (0..items.len() as PhaseTag).collect();
        Self {
            items,
            index,
            warnings: Vec::new(),
        }
    }

    /// Attach build warnings.
    pub(crate) fn with_warnings(mut self, warnings: Vec<SegmentWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Number of phases.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set holds no phases.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The phases.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The tag of each phase.
    pub fn index(&self) -> &[PhaseTag] {
        &self.index
    }

    /// Peak overflow or incomplete merging met while building the set.
    pub fn warnings(&self) -> &[SegmentWarning] {
        &self.warnings
    }

    /// Position of the phase tagged `tag`.
    pub fn position(&self, tag: PhaseTag) -> Option<usize> {
        self.index.iter().position(|&t| t == tag)
    }

    /// The phase tagged `tag`.
    pub fn get(&self, tag: PhaseTag) -> Option<&T> {
        self.position(tag).map(|i| &self.items[i])
    }

    /// `(tag, phase)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (PhaseTag, &T)> {
        self.index.iter().copied().zip(&self.items)
    }

    /// Split into phases and tags.
    pub fn into_parts(self) -> (Vec<T>, Vec<PhaseTag>) {
        (self.items, self.index)
    }
}

impl<T: LnPi> PhaseSet<T> {
    /// Barrier estimator over the phases.
    ///
    /// The landscape is the first phase's data, its domain the union of
    /// every phase's domain, and each phase's domain is one region.
    ///
    /// # Errors
    ///
    /// [`SegmentError::NoRegions`] (wrapped) for an empty set, or anything
    /// [`FreeEnergy::owned`] rejects.
    pub fn free_energy(
        &self,
        connectivity: Option<Connectivity>,
    ) -> Result<FreeEnergy<'static>, PhaseError> {
        let first = self.items.first().ok_or(SegmentError::NoRegions)?;
        let excluded: Vec<Mask> = self.items.iter().map(|p| p.mask().to_owned()).collect();

        let mut domain_excluded = first.mask().to_owned();
        for mask in &excluded[1..] {
            if mask.shape() != domain_excluded.shape() {
                return Err(SegmentError::ShapeMismatch {
                    expected: domain_excluded.shape().to_vec(),
                    got: mask.shape().to_vec(),
                }
                .into());
            }
            domain_excluded.zip_mut_with(mask, |all, &m| *all &= m);
        }
        let field = Field::with_mask(
            first.data().to_owned(),
            domain_excluded,
            MaskConvention::Masked,
        )?;
        Ok(FreeEnergy::owned(
            field,
            &excluded,
            MaskConvention::Masked,
            connectivity,
        )?)
    }

    /// Smallest barrier from the phase tagged `tag` to the phases tagged
    /// `nebrs` (every other phase when `None`).
    ///
    /// Returns `0.0` when `tag` is absent and `+inf` when none of the
    /// neighbours is present. Absent neighbour tags are skipped.
    pub fn delta_w(&self, tag: PhaseTag, nebrs: Option<&[PhaseTag]>) -> Result<f64, PhaseError> {
        let Some(idx) = self.position(tag) else {
            return Ok(0.0);
        };
        let targets: Vec<usize> = match nebrs {
            Some(tags) => tags.iter().filter_map(|&t| self.position(t)).collect(),
            None => (0..self.len()).collect(),
        };
        if targets.iter().all(|&j| j == idx) {
            return Ok(f64::INFINITY);
        }
        let fe = self.free_energy(None)?;
        Ok(fe.delta_w_to(idx, Some(&targets))?)
    }
}
