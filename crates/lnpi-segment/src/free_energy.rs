//! Free-energy minima and transition barriers between regions.
//!
//! For regions `i` and `j` of an lnPi landscape:
//!
//! - `w_min[i] = -max(lnPi over region i)` is the free energy of the
//!   region's most stable macrostate.
//! - `w_tran[i, j] = -max(lnPi over the shared boundary)` is the free
//!   energy of the lowest barrier between them, `+inf` when the regions do
//!   not touch. The diagonal is `+inf`.
//! - `delta_w[i, j] = w_tran[i, j] - w_min[i]` is the barrier height seen
//!   from region `i`.
//!
//! All three are computed on first access and cached on the instance.

use std::borrow::Cow;
use std::cell::OnceCell;

use indexmap::IndexMap;
use lnpi_core::{change_convention, Field, LabelMap, Mask, MaskConvention};
use lnpi_space::{find_boundaries, BoundaryMode, Connectivity, Neighbourhood};
use ndarray::{Array1, Array2};

use crate::config::LabelsToMasks;
use crate::error::SegmentError;
use crate::grid_helpers::{check_shape, flatten, grid_of, nan_max, neighbourhood};
use crate::labels::labels_to_masks;

/// Boundary overlap of each adjacent pair `(i, j)` with `i < j`, as row-major
/// cell ranks. Pairs are stored in row-major pair order.
type Overlaps = IndexMap<(usize, usize), Vec<usize>>;

/// Barrier estimator over a set of regions of one field.
///
/// Not `Sync`: the lazily computed matrices live in [`OnceCell`]s.
///
/// # Examples
///
/// ```
/// use lnpi_core::{Field, MaskConvention};
/// use lnpi_segment::FreeEnergy;
/// use ndarray::Array1;
///
/// let field = Field::from_vec(vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]).unwrap();
/// let left = Array1::from_shape_fn(9, |i| i < 5).into_dyn();
/// let right = Array1::from_shape_fn(9, |i| i >= 5).into_dyn();
/// let fe = FreeEnergy::new(&field, &[left, right], MaskConvention::Image, None).unwrap();
/// assert_eq!(fe.w_min().to_vec(), vec![-2.0, -2.0]);
/// assert_eq!(fe.w_tran()[[0, 1]], -1.0);
/// assert_eq!(fe.delta_w()[[0, 1]], 1.0);
/// ```
#[derive(Debug)]
pub struct FreeEnergy<'a> {
    field: Cow<'a, Field>,
    masks: Vec<Mask>,
    flat: Vec<Vec<bool>>,
    values: Vec<f64>,
    nbhd: Neighbourhood,
    boundaries: Vec<Vec<bool>>,
    overlaps: OnceCell<Overlaps>,
    w_min: OnceCell<Array1<f64>>,
    w_tran: OnceCell<Array2<f64>>,
    delta_w: OnceCell<Array2<f64>>,
}

impl<'a> FreeEnergy<'a> {
    /// Build an estimator borrowing `field`.
    ///
    /// `masks` are read in `convention`; `connectivity` defaults to the
    /// full dimensionality of the field.
    ///
    /// # Errors
    ///
    /// - [`SegmentError::NoRegions`] if `masks` is empty.
    /// - [`SegmentError::ShapeMismatch`] if a mask does not match the field.
    /// - [`SegmentError::EmptyRegion`] if a mask selects no cells.
    pub fn new(
        field: &'a Field,
        masks: &[Mask],
        convention: MaskConvention,
        connectivity: Option<Connectivity>,
    ) -> Result<Self, SegmentError> {
        Self::build(Cow::Borrowed(field), masks, convention, connectivity)
    }

    /// Build an estimator that owns its field.
    pub fn owned(
        field: Field,
        masks: &[Mask],
        convention: MaskConvention,
        connectivity: Option<Connectivity>,
    ) -> Result<FreeEnergy<'static>, SegmentError> {
        FreeEnergy::build(Cow::Owned(field), masks, convention, connectivity)
    }

    /// Build an estimator from a label map, one region per feature.
    ///
    /// `options.connectivity` is used both for growing boundaries (when
    /// `include_boundary` is set) and for the estimator itself.
    pub fn from_labels(
        field: &'a Field,
        labels: &LabelMap,
        options: &LabelsToMasks,
    ) -> Result<Self, SegmentError> {
        check_shape(field, labels.shape())?;
        let regions = labels_to_masks(labels, options, MaskConvention::Image)?;
        Self::new(
            field,
            &regions.masks,
            MaskConvention::Image,
            options.connectivity,
        )
    }

    fn build(
        field: Cow<'a, Field>,
        masks: &[Mask],
        convention: MaskConvention,
        connectivity: Option<Connectivity>,
    ) -> Result<Self, SegmentError> {
        if masks.is_empty() {
            return Err(SegmentError::NoRegions);
        }
        let grid = grid_of(&field)?;
        let nbhd = neighbourhood(&grid, connectivity);

        let mut image = Vec::with_capacity(masks.len());
        let mut flat = Vec::with_capacity(masks.len());
        let mut boundaries = Vec::with_capacity(masks.len());
        for (index, mask) in masks.iter().enumerate() {
            check_shape(&field, mask.shape())?;
            let mask = change_convention(mask, convention, MaskConvention::Image);
            let cells = flatten(&mask);
            if !cells.iter().any(|&m| m) {
                return Err(SegmentError::EmptyRegion { index });
            }
            boundaries.push(find_boundaries(&cells, &nbhd, BoundaryMode::Thick)?);
            flat.push(cells);
            image.push(mask);
        }

        let values = field.values();
        Ok(Self {
            field,
            masks: image,
            flat,
            values,
            nbhd,
            boundaries,
            overlaps: OnceCell::new(),
            w_min: OnceCell::new(),
            w_tran: OnceCell::new(),
            delta_w: OnceCell::new(),
        })
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Always `false`: construction rejects an empty mask list.
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// The landscape the regions live on.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Region masks, image convention.
    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    /// Neighbourhood used for boundaries.
    pub fn neighbourhood(&self) -> &Neighbourhood {
        &self.nbhd
    }

    /// Thick boundary of each region, flat row-major.
    pub fn boundaries(&self) -> &[Vec<bool>] {
        &self.boundaries
    }

    /// Cells shared by the boundaries of `i` and `j` and lying in either
    /// region, as row-major ranks. `None` when the regions are not adjacent.
    pub fn boundary_overlap(&self, i: usize, j: usize) -> Option<&[usize]> {
        let key = if i < j { (i, j) } else { (j, i) };
        self.overlaps().get(&key).map(Vec::as_slice)
    }

    /// Whether regions `i` and `j` share a boundary.
    pub fn adjacent(&self, i: usize, j: usize) -> bool {
        self.boundary_overlap(i, j).is_some()
    }

    /// Regions adjacent to `i`, ascending.
    pub fn neighbours_of(&self, i: usize) -> Vec<usize> {
        (0..self.len())
            .filter(|&j| j != i && self.adjacent(i, j))
            .collect()
    }

    /// Free energy of each region's minimum.
    pub fn w_min(&self) -> &Array1<f64> {
        self.w_min.get_or_init(|| {
            self.flat
                .iter()
                .map(|mask| {
                    let cells = mask.iter().enumerate().filter(|&(_, &m)| m);
                    -self.masked_max(cells.map(|(r, _)| r))
                })
                .collect()
        })
    }

    /// Transition free energy between every pair of regions.
    pub fn w_tran(&self) -> &Array2<f64> {
        self.w_tran.get_or_init(|| {
            let n = self.len();
            let mut w = Array2::from_elem((n, n), f64::INFINITY);
            for (&(i, j), cells) in self.overlaps() {
                let barrier = -self.masked_max(cells.iter().copied());
                w[[i, j]] = barrier;
                w[[j, i]] = barrier;
            }
            w
        })
    }

    /// Barrier height from each region to each other region.
    pub fn delta_w(&self) -> &Array2<f64> {
        self.delta_w.get_or_init(|| {
            let w_tran = self.w_tran();
            let w_min = self.w_min();
            Array2::from_shape_fn(w_tran.raw_dim(), |(i, j)| {
                let d = w_tran[[i, j]] - w_min[i];
                if d.is_nan() {
                    f64::INFINITY
                } else {
                    d
                }
            })
        })
    }

    /// Smallest barrier from region `idx` to any of `nebrs` (every other
    /// region when `None`). `+inf` when there is no neighbour to cross to.
    ///
    /// # Errors
    ///
    /// [`SegmentError::RegionIndex`] if `idx` or a neighbour is out of range.
    pub fn delta_w_to(&self, idx: usize, nebrs: Option<&[usize]>) -> Result<f64, SegmentError> {
        let count = self.len();
        let in_range = |index: usize| {
            if index < count {
                Ok(index)
            } else {
                Err(SegmentError::RegionIndex { index, count })
            }
        };
        in_range(idx)?;
        let delta_w = self.delta_w();
        let mut best = f64::INFINITY;
        match nebrs {
            Some(list) => {
                for &j in list {
                    in_range(j)?;
                    if j != idx {
                        best = best.min(delta_w[[idx, j]]);
                    }
                }
            }
            None => {
                for j in (0..count).filter(|&j| j != idx) {
                    best = best.min(delta_w[[idx, j]]);
                }
            }
        }
        Ok(best)
    }

    fn masked_max<I: Iterator<Item = usize>>(&self, ranks: I) -> f64 {
        nan_max(ranks.map(|r| self.values[r]))
    }

    fn overlaps(&self) -> &Overlaps {
        self.overlaps.get_or_init(|| {
            let n = self.len();
            let mut out = Overlaps::new();
            for i in 0..n {
                for j in (i + 1)..n {
                    let (bi, bj) = (&self.boundaries[i], &self.boundaries[j]);
                    let (mi, mj) = (&self.flat[i], &self.flat[j]);
                    let cells: Vec<usize> = (0..bi.len())
                        .filter(|&r| bi[r] && bj[r] && (mi[r] || mj[r]))
                        .collect();
                    if !cells.is_empty() {
                        out.insert((i, j), cells);
                    }
                }
            }
            tracing::debug!(regions = n, adjacent_pairs = out.len(), "boundary overlaps");
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    fn line_field(values: &[f64]) -> Field {
        Field::from_vec(values.to_vec()).unwrap()
    }

    fn line_mask(len: usize, range: std::ops::Range<usize>) -> Mask {
        ArrayD::from_shape_fn(IxDyn(&[len]), |ix| range.contains(&ix[0]))
    }

    const THREE_WELLS: [f64; 13] = [
        1.0, 2.0, 1.0, -3.0, -4.0, -3.0, 1.0, 2.01, 1.5, 0.9, 0.85, 1.0, 0.5,
    ];

    fn three_wells(field: &Field) -> FreeEnergy<'_> {
        let masks = [line_mask(13, 0..4), line_mask(13, 4..10), line_mask(13, 10..13)];
        FreeEnergy::new(field, &masks, MaskConvention::Image, None).unwrap()
    }

    #[test]
    fn two_wells_barrier() {
        let field = line_field(&[0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]);
        let masks = [line_mask(9, 0..5), line_mask(9, 5..9)];
        let fe = FreeEnergy::new(&field, &masks, MaskConvention::Image, None).unwrap();
        assert_eq!(fe.boundary_overlap(0, 1), Some(&[4, 5][..]));
        assert_eq!(fe.boundary_overlap(1, 0), Some(&[4, 5][..]));
        assert_eq!(fe.w_tran()[[0, 1]], -1.0);
        assert_eq!(fe.w_tran()[[0, 0]], f64::INFINITY);
        assert_eq!(fe.delta_w()[[1, 0]], 1.0);
        assert_eq!(fe.delta_w_to(0, None), Ok(1.0));
    }

    #[test]
    fn three_wells_costs() {
        let field = line_field(&THREE_WELLS);
        let fe = three_wells(&field);
        assert_eq!(fe.w_min().to_vec(), vec![-2.0, -2.01, -1.0]);
        assert!(!fe.adjacent(0, 2));
        assert_eq!(fe.neighbours_of(1), vec![0, 2]);

        let d = fe.delta_w();
        assert!((d[[2, 1]] - 0.1).abs() < 1e-12);
        assert!((d[[0, 1]] - 5.0).abs() < 1e-12);
        assert!((d[[1, 2]] - 1.11).abs() < 1e-12);
        assert_eq!(d[[0, 2]], f64::INFINITY);
        assert_eq!(d[[2, 0]], f64::INFINITY);
    }

    #[test]
    fn delta_w_to_subsets() {
        let field = line_field(&THREE_WELLS);
        let fe = three_wells(&field);
        assert_eq!(fe.delta_w_to(0, Some(&[2])), Ok(f64::INFINITY));
        assert_eq!(fe.delta_w_to(0, Some(&[])), Ok(f64::INFINITY));
        assert!((fe.delta_w_to(2, None).unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(
            fe.delta_w_to(3, None),
            Err(SegmentError::RegionIndex { index: 3, count: 3 })
        );
        assert_eq!(
            fe.delta_w_to(0, Some(&[5])),
            Err(SegmentError::RegionIndex { index: 5, count: 3 })
        );
    }

    #[test]
    fn w_tran_is_symmetric_with_infinite_diagonal() {
        let field = line_field(&THREE_WELLS);
        let fe = three_wells(&field);
        let w = fe.w_tran();
        for i in 0..3 {
            assert_eq!(w[[i, i]], f64::INFINITY);
            for j in 0..3 {
                assert_eq!(w[[i, j]], w[[j, i]]);
            }
        }
    }

    #[test]
    fn rejects_bad_masks() {
        let field = line_field(&[0.0; 4]);
        assert_eq!(
            FreeEnergy::new(&field, &[], MaskConvention::Image, None).err(),
            Some(SegmentError::NoRegions)
        );
        let empty = [line_mask(4, 0..2), line_mask(4, 0..0)];
        assert_eq!(
            FreeEnergy::new(&field, &empty, MaskConvention::Image, None).err(),
            Some(SegmentError::EmptyRegion { index: 1 })
        );
        let wrong = [line_mask(5, 0..2)];
        assert!(matches!(
            FreeEnergy::new(&field, &wrong, MaskConvention::Image, None),
            Err(SegmentError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn masked_convention_is_inverted() {
        let field = line_field(&[0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]);
        let masks = [line_mask(9, 5..9), line_mask(9, 0..5)];
        let fe = FreeEnergy::new(&field, &masks, MaskConvention::Masked, None).unwrap();
        assert_eq!(fe.masks()[0], line_mask(9, 0..5));
        assert_eq!(fe.w_tran()[[0, 1]], -1.0);
    }

    #[test]
    fn from_labels_matches_masks() {
        let field = line_field(&THREE_WELLS);
        let labels: LabelMap =
            ndarray::Array1::from(vec![1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 3, 3, 3]).into_dyn();
        let fe = FreeEnergy::from_labels(&field, &labels, &LabelsToMasks::default()).unwrap();
        assert_eq!(fe.len(), 3);
        assert_eq!(fe.w_min().to_vec(), vec![-2.0, -2.01, -1.0]);
    }

    #[test]
    fn nan_cells_are_ignored() {
        let field = line_field(&[0.0, f64::NAN, 2.0, 1.0, 0.0]);
        let masks = [line_mask(5, 0..2), line_mask(5, 2..5)];
        let fe = FreeEnergy::new(&field, &masks, MaskConvention::Image, None).unwrap();
        // Overlap is cells 1 and 2; the NaN at 1 is skipped.
        assert_eq!(fe.w_tran()[[0, 1]], -2.0);
        assert_eq!(fe.w_min()[0], 0.0);
    }

    #[test]
    fn owned_estimator_outlives_field_binding() {
        let fe = {
            let field = line_field(&[0.0, 1.0, 0.0]);
            FreeEnergy::owned(field, &[line_mask(3, 0..3)], MaskConvention::Image, None).unwrap()
        };
        assert_eq!(fe.w_min()[0], -1.0);
        assert_eq!(fe.delta_w_to(0, None), Ok(f64::INFINITY));
    }
}
