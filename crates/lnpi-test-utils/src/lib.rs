//! Test utilities and mock types for lnPi segmentation.
//!
//! Provides [`MockLnPi`], an in-memory implementation of the [`LnPi`]
//! collaborator trait, partition assertions shared by the integration
//! tests, and landscape [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use lnpi_core::{change_convention, LnPi, Mask, MaskConvention};
use ndarray::{ArrayD, ArrayViewD, Axis};

/// In-memory lnPi container.
///
/// Reweighting follows the grand-canonical identity
/// `lnPi(N; lnz') = lnPi(N; lnz) + sum_k N_k (lnz'_k - lnz_k)`, with the
/// particle number `N_k` taken as the index along axis `k`. The shift
/// that re-normalises the distribution is omitted; segmentation is
/// insensitive to a constant offset.
#[derive(Clone, Debug, PartialEq)]
pub struct MockLnPi {
    data: ArrayD<f64>,
    mask: Mask,
    lnz: Vec<f64>,
}

impl MockLnPi {
    /// Container with every cell in the domain and `lnz = 0`.
    pub fn new(data: ArrayD<f64>) -> Self {
        let mask = Mask::from_elem(data.raw_dim(), false);
        let lnz = vec![0.0; data.ndim()];
        Self { data, mask, lnz }
    }

    /// Container with an explicit excluded-cell mask (masked convention).
    pub fn with_mask(data: ArrayD<f64>, mask: Mask) -> Self {
        assert_eq!(data.shape(), mask.shape(), "mask shape must match data");
        let lnz = vec![0.0; data.ndim()];
        Self { data, mask, lnz }
    }

    /// One-dimensional container.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self::new(ndarray::Array1::from(values).into_dyn())
    }

    /// Current log-activities.
    pub fn lnz(&self) -> &[f64] {
        &self.lnz
    }

    /// Number of cells inside the domain.
    pub fn domain_count(&self) -> usize {
        self.mask.iter().filter(|&&m| !m).count()
    }

    /// Domain in image convention.
    pub fn domain(&self) -> Mask {
        change_convention(&self.mask, MaskConvention::Masked, MaskConvention::Image)
    }
}

impl LnPi for MockLnPi {
    fn data(&self) -> ArrayViewD<'_, f64> {
        self.data.view()
    }

    fn mask(&self) -> ArrayViewD<'_, bool> {
        self.mask.view()
    }

    fn reweight(&self, lnz: &[f64]) -> Self {
        let mut data = self.data.clone();
        for (k, (new, old)) in lnz.iter().zip(&self.lnz).enumerate() {
            let shift = new - old;
            for (n, mut lane) in data.axis_iter_mut(Axis(k)).enumerate() {
                lane.mapv_inplace(|v| v + n as f64 * shift);
            }
        }
        let mut next = lnz.to_vec();
        next.resize(self.lnz.len(), 0.0);
        Self {
            data,
            mask: self.mask.clone(),
            lnz: next,
        }
    }

    fn list_from_masks(&self, masks: &[Mask], convention: MaskConvention) -> Vec<Self> {
        masks
            .iter()
            .map(|region| {
                let region = change_convention(region, convention, MaskConvention::Image);
                let mut mask = self.mask.clone();
                mask.zip_mut_with(&region, |excluded, &inside| *excluded |= !inside);
                Self {
                    data: self.data.clone(),
                    mask,
                    lnz: self.lnz.clone(),
                }
            })
            .collect()
    }
}

/// Assert that `masks` are pairwise disjoint and together cover exactly the
/// in-domain cells of `domain` (image convention).
pub fn assert_masks_partition(masks: &[Mask], domain: &Mask) {
    let flat: Vec<Vec<bool>> = masks
        .iter()
        .map(|m| {
            assert_eq!(m.shape(), domain.shape(), "mask shape differs from domain");
            m.iter().copied().collect()
        })
        .collect();
    for (rank, &inside) in domain.iter().enumerate() {
        let owners = flat.iter().filter(|m| m[rank]).count();
        if inside {
            assert_eq!(owners, 1, "domain cell {rank} owned by {owners} regions");
        } else {
            assert_eq!(owners, 0, "excluded cell {rank} assigned to a region");
        }
    }
}

/// Assert that a square matrix is symmetric (infinities compare equal).
pub fn assert_symmetric(matrix: &ndarray::Array2<f64>) {
    let (rows, cols) = matrix.dim();
    assert_eq!(rows, cols, "matrix is not square");
    for i in 0..rows {
        for j in 0..cols {
            let (a, b) = (matrix[[i, j]], matrix[[j, i]]);
            assert!(
                a == b || (a.is_nan() && b.is_nan()),
                "asymmetric at ({i}, {j}): {a} vs {b}"
            );
        }
    }
}
