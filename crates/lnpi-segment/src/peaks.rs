//! Adaptive local-maximum detection.
//!
//! Peaks are searched at a sequence of spacing radii. Small radii resolve
//! closely spaced maxima but pick up noise; large radii suppress noise but
//! can miss real phases. [`find_peaks_adaptive`] tries the radii in order
//! and keeps the first result that respects the configured peak cap.

use lnpi_core::{Coord, Field, LabelMap, Mask};
use lnpi_space::{grey_max_filter, label, Connectivity, Grid};

use crate::config::{OverflowPolicy, PeakConfig};
use crate::error::{SegmentError, SegmentWarning};
use crate::grid_helpers::{grid_of, labels_from_flat, mask_from_flat, nan_max, neighbourhood};

/// Local maxima of a field, strongest first.
#[derive(Clone, Debug, PartialEq)]
pub struct Peaks {
    grid: Grid,
    ranks: Vec<usize>,
    min_distance: usize,
    warnings: Vec<SegmentWarning>,
}

impl Peaks {
    /// Number of peaks.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Whether no peak was found.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Row-major positions of the peaks, in acceptance order.
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    /// Coordinates of the peaks, in acceptance order.
    pub fn coords(&self) -> Vec<Coord> {
        self.ranks.iter().map(|&r| self.grid.coord_of(r)).collect()
    }

    /// The spacing radius that produced these peaks.
    pub fn min_distance(&self) -> usize {
        self.min_distance
    }

    /// Non-fatal conditions hit while searching.
    pub fn warnings(&self) -> &[SegmentWarning] {
        &self.warnings
    }

    /// Boolean array with `true` at every peak.
    pub fn to_mask(&self) -> Result<Mask, SegmentError> {
        mask_from_flat(self.grid.shape(), self.flat_mask())
    }

    /// Watershed seeds: one label per connected cluster of peaks.
    ///
    /// Peaks more than one cell apart always get distinct labels; only a
    /// zero spacing radius can produce touching peaks, which then share a
    /// label.
    pub fn to_markers(&self, connectivity: Option<Connectivity>) -> Result<LabelMap, SegmentError> {
        let nbhd = neighbourhood(&self.grid, connectivity);
        let (labels, _) = label(&self.flat_mask(), &nbhd)?;
        labels_from_flat(self.grid.shape(), labels)
    }

    fn flat_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.grid.cell_count()];
        for &r in &self.ranks {
            mask[r] = true;
        }
        mask
    }
}

/// Find local maxima, widening the spacing radius until at most
/// `config.max_peaks` remain.
///
/// The field is first shifted so its smallest finite value is zero, then
/// for each radius in `config.min_distance` a cell qualifies when it lies
/// in the domain, equals the maximum of its in-domain window and exceeds
/// `max(threshold_abs, threshold_rel * max)`. Qualifying cells are
/// accepted strongest-first, dropping any within the radius of an already
/// accepted peak.
///
/// # Errors
///
/// - [`SegmentError::InvalidConfig`] if the config fails validation.
/// - [`SegmentError::CountExceeded`] if the cap is still exceeded at the
///   last radius and the policy is [`OverflowPolicy::Raise`].
///
/// # Examples
///
/// ```
/// use lnpi_core::Field;
/// use lnpi_segment::{find_peaks_adaptive, PeakConfig};
///
/// let field = Field::from_vec(vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]).unwrap();
/// let peaks = find_peaks_adaptive(&field, &PeakConfig::default()).unwrap();
/// assert_eq!(peaks.ranks(), &[2, 6]);
/// ```
pub fn find_peaks_adaptive(field: &Field, config: &PeakConfig) -> Result<Peaks, SegmentError> {
    config.validate()?;
    let search = PeakSearch::new(field, config)?;

    let mut ranks = Vec::new();
    let mut used = config.min_distance[0];
    for &radius in &config.min_distance {
        ranks = search.at_radius(radius)?;
        used = radius;
        if config.max_peaks.map_or(true, |max| ranks.len() <= max) {
            break;
        }
    }

    let mut warnings = Vec::new();
    if let Some(max) = config.max_peaks {
        let found = ranks.len();
        if found > max {
            match config.overflow {
                OverflowPolicy::Ignore => {}
                OverflowPolicy::Warn => {
                    tracing::warn!(found, max, radius = used, "more peaks than allowed");
                    warnings.push(SegmentWarning::PeakOverflow { found, max });
                }
                OverflowPolicy::Raise => return Err(SegmentError::CountExceeded { found, max }),
            }
        }
    }
    tracing::debug!(count = ranks.len(), radius = used, "peak search done");

    Ok(Peaks {
        grid: search.grid,
        ranks,
        min_distance: used,
        warnings,
    })
}

/// The `count` strongest peaks at the first configured radius.
///
/// No overflow policy applies: extra peaks are simply dropped.
pub fn strongest_peaks(
    field: &Field,
    config: &PeakConfig,
    count: usize,
) -> Result<Peaks, SegmentError> {
    config.validate()?;
    let search = PeakSearch::new(field, config)?;
    let radius = config.min_distance[0];
    let mut ranks = search.at_radius(radius)?;
    ranks.truncate(count);
    Ok(Peaks {
        grid: search.grid,
        ranks,
        min_distance: radius,
        warnings: Vec::new(),
    })
}

/// Normalised field and threshold shared by every radius.
struct PeakSearch {
    grid: Grid,
    values: Vec<f64>,
    include: Vec<bool>,
    threshold: f64,
}

impl PeakSearch {
    fn new(field: &Field, config: &PeakConfig) -> Result<Self, SegmentError> {
        let grid = grid_of(field)?;
        let raw = field.values();
        let floor = raw
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f64::INFINITY, f64::min);
        let floor = if floor.is_finite() { floor } else { 0.0 };
        let values: Vec<f64> = raw.iter().map(|v| v - floor).collect();
        let include = field.domain_values();

        let top = nan_max(
            values
                .iter()
                .zip(&include)
                .filter(|&(_, &inc)| inc)
                .map(|(&v, _)| v),
        );
        let threshold = config.threshold_abs.max(config.threshold_rel * top);

        Ok(Self {
            grid,
            values,
            include,
            threshold,
        })
    }

    /// Accepted peaks for one spacing radius, strongest first.
    fn at_radius(&self, radius: usize) -> Result<Vec<usize>, SegmentError> {
        let window_max = grey_max_filter(&self.values, &self.include, &self.grid, radius)?;

        let mut candidates: Vec<usize> = (0..self.values.len())
            .filter(|&r| {
                let v = self.values[r];
                self.include[r] && !v.is_nan() && v > self.threshold && v >= window_max[r]
            })
            .collect();
        candidates.sort_by(|&a, &b| {
            self.values[b]
                .total_cmp(&self.values[a])
                .then_with(|| a.cmp(&b))
        });

        let mut accepted: Vec<usize> = Vec::new();
        for c in candidates {
            if accepted
                .iter()
                .all(|&p| self.grid.chebyshev(p, c) > radius)
            {
                accepted.push(c);
            }
        }
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, ArrayD, IxDyn};

    fn line(values: &[f64]) -> Field {
        Field::from_vec(values.to_vec()).unwrap()
    }

    fn config(radii: &[usize], max: Option<usize>, overflow: OverflowPolicy) -> PeakConfig {
        PeakConfig {
            min_distance: radii.to_vec(),
            max_peaks: max,
            overflow,
            ..Default::default()
        }
    }

    const ALTERNATING: [f64; 11] = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];

    #[test]
    fn two_wells() {
        let field = line(&[0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]);
        let peaks = find_peaks_adaptive(&field, &PeakConfig::default()).unwrap();
        assert_eq!(peaks.ranks(), &[2, 6]);
        assert_eq!(peaks.min_distance(), 1);
        assert!(peaks.warnings().is_empty());
        assert_eq!(peaks.coords()[1].as_slice(), &[6]);
    }

    #[test]
    fn raise_on_overflow() {
        let field = line(&ALTERNATING);
        let err = find_peaks_adaptive(&field, &config(&[1], Some(2), OverflowPolicy::Raise));
        assert_eq!(err, Err(SegmentError::CountExceeded { found: 5, max: 2 }));

        let err = find_peaks_adaptive(&field, &config(&[1, 2], Some(2), OverflowPolicy::Raise));
        assert_eq!(err, Err(SegmentError::CountExceeded { found: 3, max: 2 }));
    }

    #[test]
    fn ignore_keeps_last_radius() {
        let field = line(&ALTERNATING);
        let peaks =
            find_peaks_adaptive(&field, &config(&[1, 2], Some(2), OverflowPolicy::Ignore)).unwrap();
        assert_eq!(peaks.ranks(), &[1, 5, 9]);
        assert_eq!(peaks.min_distance(), 2);
        assert!(peaks.warnings().is_empty());
    }

    #[test]
    fn warn_records_overflow() {
        let field = line(&ALTERNATING);
        let peaks =
            find_peaks_adaptive(&field, &config(&[1, 2], Some(2), OverflowPolicy::Warn)).unwrap();
        assert_eq!(peaks.len(), 3);
        assert_eq!(
            peaks.warnings(),
            &[SegmentWarning::PeakOverflow { found: 3, max: 2 }]
        );
    }

    #[test]
    fn first_radius_meeting_cap_wins() {
        let field = line(&ALTERNATING);
        let peaks =
            find_peaks_adaptive(&field, &config(&[1, 2, 4], Some(3), OverflowPolicy::Raise))
                .unwrap();
        assert_eq!(peaks.min_distance(), 2);
        assert_eq!(peaks.len(), 3);
    }

    #[test]
    fn excluded_cells_never_peak() {
        let data = Array1::from(vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0]).into_dyn();
        let domain = ArrayD::from_shape_fn(IxDyn(&[9]), |ix| ix[0] < 5);
        let field = Field::with_domain(data, domain).unwrap();
        let peaks = find_peaks_adaptive(&field, &PeakConfig::default()).unwrap();
        assert_eq!(peaks.ranks(), &[2]);
    }

    #[test]
    fn threshold_filters_shallow_bumps() {
        // Both bumps are above the floor by less than the default 0.2.
        let field = line(&[0.0, 0.1, 0.0, 0.15, 0.0]);
        let peaks = find_peaks_adaptive(&field, &PeakConfig::default()).unwrap();
        assert!(peaks.is_empty());

        let rel = PeakConfig {
            threshold_abs: 0.0,
            threshold_rel: 0.9,
            ..Default::default()
        };
        let peaks = find_peaks_adaptive(&field, &rel).unwrap();
        assert_eq!(peaks.ranks(), &[3]);
    }

    #[test]
    fn plateau_thinned_by_spacing() {
        let field = line(&[0.0, 2.0, 2.0, 2.0, 0.0]);
        let narrow = find_peaks_adaptive(&field, &config(&[1], None, OverflowPolicy::Warn)).unwrap();
        assert_eq!(narrow.ranks(), &[1, 3]);
        let wide = find_peaks_adaptive(&field, &config(&[2], None, OverflowPolicy::Warn)).unwrap();
        assert_eq!(wide.ranks(), &[1]);
    }

    #[test]
    fn strongest_peaks_truncates_without_policy() {
        let field = line(&[0.0, 1.0, 0.0, 3.0, 0.0, 2.0, 0.0]);
        let cfg = config(&[1], Some(1), OverflowPolicy::Raise);
        let peaks = strongest_peaks(&field, &cfg, 2).unwrap();
        assert_eq!(peaks.ranks(), &[3, 5]);
    }

    #[test]
    fn markers_label_each_peak() {
        let field = line(&[0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]);
        let peaks = find_peaks_adaptive(&field, &PeakConfig::default()).unwrap();
        let markers = peaks.to_markers(None).unwrap();
        assert_eq!(markers[[2]], 1);
        assert_eq!(markers[[6]], 2);
        assert_eq!(markers.iter().filter(|&&l| l != 0).count(), 2);
        let mask = peaks.to_mask().unwrap();
        assert!(mask[[2]] && mask[[6]] && !mask[[0]]);
    }

    #[test]
    fn two_dimensional_wells() {
        let data = ArrayD::from_shape_fn(IxDyn(&[9, 9]), |ix| {
            let (r, c) = (ix[0] as f64, ix[1] as f64);
            let a = -((r - 2.0).powi(2) + (c - 2.0).powi(2));
            let b = -((r - 6.0).powi(2) + (c - 6.0).powi(2)) + 0.5;
            a.max(b)
        });
        let field = Field::new(data).unwrap();
        let peaks = find_peaks_adaptive(&field, &PeakConfig::default()).unwrap();
        let coords: Vec<Vec<usize>> = peaks.coords().iter().map(|c| c.to_vec()).collect();
        assert_eq!(coords, vec![vec![6, 6], vec![2, 2]]);
    }
}
