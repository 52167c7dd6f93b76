//! Phase creator configuration and per-call build requests.
//!
//! [`PhaseCreatorConfig`] holds the long-lived defaults of a
//! [`PhaseCreator`](crate::creator::PhaseCreator). A [`BuildRequest`]
//! overrides any of them for a single
//! [`build_phases`](crate::creator::PhaseCreator::build_phases) call.

use lnpi_segment::{MergeConfig, MergeOverrides};
use lnpi_space::Connectivity;

use crate::error::PhaseError;

// ── PhaseCreatorConfig ─────────────────────────────────────────────

/// Defaults for building phases.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseCreatorConfig {
    /// Maximum number of phases. Default: 2.
    pub nmax: usize,
    /// Maximum number of peaks to seed segmentation with. `None` = `2 * nmax`.
    pub nmax_peak: Option<usize>,
    /// Neighbourhood order for segmentation and barriers. `None` = full.
    pub connectivity: Option<Connectivity>,
    /// Region merging. Its `max_regions` is replaced by `nmax` on every build.
    pub merge: MergeConfig,
    /// Merge low-barrier regions before building phases. Default: `true`.
    pub merge_regions: bool,
    /// Union phases that receive the same tag. Default: `true`.
    pub merge_tagged: bool,
}

impl Default for PhaseCreatorConfig {
    fn default() -> Self {
        Self {
            nmax: 2,
            nmax_peak: None,
            connectivity: None,
            merge: MergeConfig::default(),
            merge_regions: true,
            merge_tagged: true,
        }
    }
}

impl PhaseCreatorConfig {
    /// Peak cap, falling back to twice the phase cap.
    pub fn resolved_nmax_peak(&self) -> usize {
        self.nmax_peak.unwrap_or(self.nmax.saturating_mul(2))
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// [`PhaseError::Configuration`] if `nmax` or `nmax_peak` is zero, or
    /// the merge config is invalid.
    pub fn validate(&self) -> Result<(), PhaseError> {
        if self.nmax == 0 {
            return Err(PhaseError::Configuration {
                reason: "nmax must be at least 1".to_string(),
            });
        }
        if self.nmax_peak == Some(0) {
            return Err(PhaseError::Configuration {
                reason: "nmax_peak must be at least 1".to_string(),
            });
        }
        self.merge
            .validate()
            .map_err(|e| PhaseError::Configuration {
                reason: e.to_string(),
            })
    }

    /// Apply the override fields of `request` on top of `self`.
    pub fn merged<T>(&self, request: &BuildRequest<'_, T>) -> Self {
        let nmax = request.nmax.unwrap_or(self.nmax);
        // An explicit nmax without nmax_peak re-derives the default peak cap.
        let nmax_peak = match (request.nmax_peak, request.nmax) {
            (Some(peak), _) => Some(peak),
            (None, Some(_)) => None,
            (None, None) => self.nmax_peak,
        };
        Self {
            nmax,
            nmax_peak,
            connectivity: request.connectivity.or(self.connectivity),
            merge: self.merge.merged(&MergeOverrides {
                merge_threshold: request.merge_threshold,
                ..Default::default()
            }),
            merge_regions: request.merge_regions.unwrap_or(self.merge_regions),
            merge_tagged: request.merge_tagged.unwrap_or(self.merge_tagged),
        }
    }
}

// ── BuildRequest ───────────────────────────────────────────────────

/// Per-call options for building phases. `None` keeps the creator's value.
pub struct BuildRequest<'a, T> {
    /// Reweight the reference to these log-activities first.
    pub lnz: Option<&'a [f64]>,
    /// Reference lnPi to use instead of the creator's.
    pub reference: Option<&'a T>,
    /// Merge threshold override.
    pub merge_threshold: Option<f64>,
    /// Phase cap override.
    pub nmax: Option<usize>,
    /// Peak cap override.
    pub nmax_peak: Option<usize>,
    /// Connectivity override.
    pub connectivity: Option<Connectivity>,
    /// Whether to merge low-barrier regions.
    pub merge_regions: Option<bool>,
    /// Whether to union phases sharing a tag.
    pub merge_tagged: Option<bool>,
}

impl<'a, T> BuildRequest<'a, T> {
    /// A request that overrides nothing.
    pub fn new() -> Self {
        Self {
            lnz: None,
            reference: None,
            merge_threshold: None,
            nmax: None,
            nmax_peak: None,
            connectivity: None,
            merge_regions: None,
            merge_tagged: None,
        }
    }

    /// Reweight to `lnz` before segmenting.
    pub fn lnz(mut self, lnz: &'a [f64]) -> Self {
        self.lnz = Some(lnz);
        self
    }

    /// Segment `reference` instead of the creator's reference.
    pub fn reference(mut self, reference: &'a T) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Override the phase cap.
    pub fn nmax(mut self, nmax: usize) -> Self {
        self.nmax = Some(nmax);
        self
    }

    /// Override the merge threshold.
    pub fn merge_threshold(mut self, threshold: f64) -> Self {
        self.merge_threshold = Some(threshold);
        self
    }
}

impl<T> Default for BuildRequest<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BuildRequest<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BuildRequest<'_, T> {}

impl<T> std::fmt::Debug for BuildRequest<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildRequest")
            .field("lnz", &self.lnz)
            .field("reference", &self.reference.map(|_| ".."))
            .field("merge_threshold", &self.merge_threshold)
            .field("nmax", &self.nmax)
            .field("nmax_peak", &self.nmax_peak)
            .field("connectivity", &self.connectivity)
            .field("merge_regions", &self.merge_regions)
            .field("merge_tagged", &self.merge_tagged)
            .finish()
    }
}
