//! Marker-controlled watershed on the negated lnPi landscape.
//!
//! Seeds flood outward through the domain, highest lnPi first, until every
//! reachable in-domain cell carries the label of the seed that reached it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use lnpi_core::{Field, Label, LabelMap};
use lnpi_space::Connectivity;

use crate::error::SegmentError;
use crate::grid_helpers::{check_shape, flatten, grid_of, labels_from_flat, neighbourhood};

/// Watershed seeds.
#[derive(Clone, Debug, PartialEq)]
pub enum Markers {
    /// Use this many of the strongest local maxima as seeds.
    Count(usize),
    /// Precomputed seed labels (0 = unseeded).
    Labels(LabelMap),
}

/// A cell waiting in the flood queue.
#[derive(Debug, Clone, Copy)]
struct FloodEntry {
    /// Negated lnPi value; the smallest depth floods first.
    depth: f64,
    /// Insertion counter, for FIFO order among equal depths.
    age: u64,
    rank: usize,
}

impl PartialEq for FloodEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloodEntry {}

impl PartialOrd for FloodEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloodEntry {
    // BinaryHeap pops the greatest entry, so both keys are reversed.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .depth
            .total_cmp(&self.depth)
            .then_with(|| other.age.cmp(&self.age))
    }
}

/// Flood `field` from the seeds in `markers`.
///
/// Seeds outside the field's domain are discarded, and flooding never
/// leaves the domain, so excluded cells stay 0. NaN cells flood last.
/// `connectivity` defaults to the full dimensionality of the field.
///
/// # Errors
///
/// [`SegmentError::ShapeMismatch`] if `markers` does not match the field.
pub fn watershed(
    field: &Field,
    markers: &LabelMap,
    connectivity: Option<Connectivity>,
) -> Result<LabelMap, SegmentError> {
    check_shape(field, markers.shape())?;
    let grid = grid_of(field)?;
    let nbhd = neighbourhood(&grid, connectivity);

    let domain = field.domain_values();
    let depth: Vec<f64> = field
        .values()
        .into_iter()
        .map(|v| if v.is_nan() { f64::INFINITY } else { -v })
        .collect();

    let mut labels: Vec<Label> = flatten(markers);
    let mut heap = BinaryHeap::new();
    let mut age = 0u64;
    for (rank, label) in labels.iter_mut().enumerate() {
        if !domain[rank] {
            *label = 0;
        } else if *label != 0 {
            heap.push(FloodEntry {
                depth: depth[rank],
                age,
                rank,
            });
            age += 1;
        }
    }
    tracing::debug!(seeds = heap.len(), "watershed flood start");

    while let Some(FloodEntry { rank, .. }) = heap.pop() {
        let current = labels[rank];
        for nb in nbhd.neighbours(rank) {
            if domain[nb] && labels[nb] == 0 {
                labels[nb] = current;
                heap.push(FloodEntry {
                    depth: depth[nb],
                    age,
                    rank: nb,
                });
                age += 1;
            }
        }
    }

    labels_from_flat(field.shape(), labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, ArrayD, IxDyn};

    fn seeds(len: usize, at: &[(usize, Label)]) -> LabelMap {
        let mut m = LabelMap::zeros(IxDyn(&[len]));
        for &(r, l) in at {
            m[[r]] = l;
        }
        m
    }

    #[test]
    fn splits_at_the_dip() {
        let field = Field::from_vec(vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]).unwrap();
        let labels = watershed(&field, &seeds(9, &[(2, 1), (6, 2)]), None).unwrap();
        assert_eq!(
            labels.iter().copied().collect::<Vec<_>>(),
            vec![1, 1, 1, 1, 1, 2, 2, 2, 2]
        );
    }

    #[test]
    fn uneven_wells() {
        let field = Field::from_vec(vec![
            1.0, 2.0, 1.0, -3.0, -4.0, -3.0, 1.0, 2.01, 1.5, 0.9, 0.85, 1.0, 0.5,
        ])
        .unwrap();
        let markers = seeds(13, &[(1, 1), (7, 2), (11, 3)]);
        let labels = watershed(&field, &markers, None).unwrap();
        assert_eq!(
            labels.iter().copied().collect::<Vec<_>>(),
            vec![1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 3, 3, 3]
        );
    }

    #[test]
    fn domain_blocks_flood_and_seeds() {
        let data = Array1::from(vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0]).into_dyn();
        let domain = ArrayD::from_shape_fn(IxDyn(&[9]), |ix| ix[0] != 4);
        let field = Field::with_domain(data, domain).unwrap();
        let markers = seeds(9, &[(2, 1), (4, 3)]);
        let labels = watershed(&field, &markers, None).unwrap();
        assert_eq!(
            labels.iter().copied().collect::<Vec<_>>(),
            vec![1, 1, 1, 1, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn rejects_wrong_marker_shape() {
        let field = Field::from_vec(vec![0.0; 4]).unwrap();
        assert!(matches!(
            watershed(&field, &seeds(5, &[]), None),
            Err(SegmentError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn face_connectivity_in_2d() {
        // A diagonal gap only full connectivity can cross.
        #[rustfmt::skip]
        let data = Array1::from(vec![
            5.0, -9.0,
            -9.0, 4.0,
        ]).into_shape_with_order(IxDyn(&[2, 2])).unwrap();
        let domain = ArrayD::from_shape_fn(IxDyn(&[2, 2]), |ix| ix[0] == ix[1]);
        let field = Field::with_domain(data, domain).unwrap();
        let mut markers = LabelMap::zeros(IxDyn(&[2, 2]));
        markers[[0, 0]] = 1;

        let face = watershed(&field, &markers, Some(Connectivity::FACE)).unwrap();
        assert_eq!(face[[1, 1]], 0);
        let full = watershed(&field, &markers, None).unwrap();
        assert_eq!(full[[1, 1]], 1);
    }
}
