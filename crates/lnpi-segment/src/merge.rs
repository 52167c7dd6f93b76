//! Greedy merging of regions separated by low free-energy barriers.

use lnpi_core::{change_convention, Mask, MaskConvention};
use ndarray::{Array1, Array2};

use crate::config::MergeConfig;
use crate::disjoint::RegionForest;
use crate::error::{SegmentError, SegmentWarning};
use crate::free_energy::FreeEnergy;

/// Result of [`FreeEnergy::merge_regions`].
#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    /// One mask per surviving region, in the requested convention.
    pub masks: Vec<Mask>,
    /// Transition free energies between survivors.
    pub w_tran: Array2<f64>,
    /// Free-energy minimum of each survivor.
    pub w_min: Array1<f64>,
    /// Original index of each survivor, ascending.
    pub kept: Vec<usize>,
    /// Original indices merged into each survivor, ascending.
    pub members: Vec<Vec<usize>>,
    /// Non-fatal conditions, e.g. stopping with too many regions.
    pub warnings: Vec<SegmentWarning>,
}

impl MergeOutcome {
    /// Number of surviving regions.
    pub fn len(&self) -> usize {
        self.kept.len()
    }

    /// Whether nothing survived. Never true for a valid estimator.
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

/// Cheapest live merge found in one round.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    from: usize,
    to: usize,
    cost: f64,
}

impl FreeEnergy<'_> {
    /// Merge regions greedily, cheapest barrier first.
    ///
    /// Each round picks the live pair `(i, j)` with the smallest
    /// `delta_w[i, j]` (first in row-major order on ties). Merges at or
    /// below `merge_threshold` always happen. Above it, merging continues
    /// only while `force` is set and more than `max_regions` regions are
    /// left; without `force` a [`SegmentWarning::MergeIncomplete`] is
    /// recorded if the cap is missed. When forced past the point where no
    /// two live regions touch, the first live pair is merged so the cap is
    /// still honoured.
    ///
    /// Of the two merged regions the one with the lower `w_min` survives,
    /// and its barrier to every other region becomes the lower of the two.
    ///
    /// # Errors
    ///
    /// [`SegmentError::InvalidConfig`] if the config fails validation.
    pub fn merge_regions(&self, config: &MergeConfig) -> Result<MergeOutcome, SegmentError> {
        config.validate()?;
        let n = self.len();
        let max_regions = config.max_regions.unwrap_or(n);
        let w_min = self.w_min().clone();
        let mut w_tran = self.w_tran().clone();
        let mut forest = RegionForest::new(n);
        let mut warnings = Vec::new();

        for _ in 0..n {
            let live = forest.live_count();
            if live <= 1 {
                break;
            }
            let Some(best) = cheapest_merge(&w_tran, &w_min, &forest) else {
                break;
            };
            if best.cost > config.merge_threshold {
                if !config.force {
                    if live > max_regions {
                        tracing::warn!(
                            remaining = live,
                            max = max_regions,
                            min_cost = best.cost,
                            "merge stopped above threshold with too many regions"
                        );
                        warnings.push(SegmentWarning::MergeIncomplete {
                            remaining: live,
                            max: max_regions,
                            min_cost: best.cost,
                        });
                    }
                    break;
                }
                if live <= max_regions {
                    break;
                }
            }

            let (keep, kill) = if w_min[best.to] < w_min[best.from] {
                (best.to, best.from)
            } else {
                (best.from, best.to)
            };
            for j in 0..n {
                let merged = w_tran[[keep, j]].min(w_tran[[kill, j]]);
                w_tran[[keep, j]] = merged;
                w_tran[[j, keep]] = merged;
            }
            w_tran[[keep, keep]] = f64::INFINITY;
            w_tran.row_mut(kill).fill(f64::INFINITY);
            w_tran.column_mut(kill).fill(f64::INFINITY);
            forest.union(keep, kill);
            tracing::debug!(keep, kill, cost = best.cost, "merged regions");
        }

        let kept: Vec<usize> = forest.roots().collect();
        let members: Vec<Vec<usize>> = kept.iter().map(|&r| forest.members(r).to_vec()).collect();
        let masks = members
            .iter()
            .map(|group| {
                let mut union = self.masks()[group[0]].clone();
                for &m in &group[1..] {
                    union.zip_mut_with(&self.masks()[m], |a, &b| *a |= b);
                }
                change_convention(&union, MaskConvention::Image, config.convention)
            })
            .collect();
        let sub_min = kept.iter().map(|&k| w_min[k]).collect();
        let sub_tran = Array2::from_shape_fn((kept.len(), kept.len()), |(a, b)| {
            w_tran[[kept[a], kept[b]]]
        });

        Ok(MergeOutcome {
            masks,
            w_tran: sub_tran,
            w_min: sub_min,
            kept,
            members,
            warnings,
        })
    }
}

/// First live off-diagonal pair with the smallest merge cost.
///
/// Every live pair qualifies, so when nothing is adjacent the first pair in
/// row-major order comes back with an infinite cost.
fn cheapest_merge(
    w_tran: &Array2<f64>,
    w_min: &Array1<f64>,
    forest: &RegionForest,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for from in forest.roots() {
        for to in forest.roots() {
            if from == to {
                continue;
            }
            let cost = w_tran[[from, to]] - w_min[from];
            let cost = if cost.is_nan() { f64::INFINITY } else { cost };
            if best.map_or(true, |b| cost < b.cost) {
                best = Some(Candidate { from, to, cost });
            }
        }
    }
    best
}
