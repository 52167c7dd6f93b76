//! Per-stage configuration.
//!
//! Each stage has a plain config struct with sensible defaults and an
//! all-`Option` override struct. [`PeakConfig::merged`] and
//! [`MergeConfig::merged`] apply an override on top of a base config, so a
//! long-lived segmenter can carry defaults while individual calls tweak
//! one or two knobs.

use std::fmt;
use std::str::FromStr;

use lnpi_core::{Label, MaskConvention};
use lnpi_space::Connectivity;

use crate::error::SegmentError;

/// Candidate peak-spacing radii tried when none are configured.
pub const DEFAULT_MIN_DISTANCE: [usize; 5] = [1, 5, 10, 15, 20];

// ── OverflowPolicy ─────────────────────────────────────────────────

/// What to do when more peaks than `max_peaks` survive every radius.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverflowPolicy {
    /// Keep the peaks of the largest radius silently.
    Ignore,
    /// Keep them, log a warning and record it on the result.
    #[default]
    Warn,
    /// Fail with [`SegmentError::CountExceeded`].
    Raise,
}

impl FromStr for OverflowPolicy {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "raise" => Ok(Self::Raise),
            _ => Err(SegmentError::UnknownOverflowPolicy {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ignore => "ignore",
            Self::Warn => "warn",
            Self::Raise => "raise",
        })
    }
}

// ── PeakConfig ─────────────────────────────────────────────────────

/// Configuration for [`find_peaks_adaptive`](crate::peaks::find_peaks_adaptive).
#[derive(Clone, Debug, PartialEq)]
pub struct PeakConfig {
    /// Candidate spacing radii, tried in order. Default: `[1, 5, 10, 15, 20]`.
    pub min_distance: Vec<usize>,
    /// Threshold relative to the largest normalised value. Default: 0.0.
    pub threshold_rel: f64,
    /// Absolute threshold on the normalised field. Default: 0.2.
    pub threshold_abs: f64,
    /// Maximum number of peaks. `None` = unbounded. Default: `None`.
    pub max_peaks: Option<usize>,
    /// Behaviour when `max_peaks` cannot be met. Default: [`OverflowPolicy::Warn`].
    pub overflow: OverflowPolicy,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            min_distance: DEFAULT_MIN_DISTANCE.to_vec(),
            threshold_rel: 0.0,
            threshold_abs: 0.2,
            max_peaks: None,
            overflow: OverflowPolicy::Warn,
        }
    }
}

impl PeakConfig {
    /// Check structural invariants.
    ///
    /// The radius list must be non-empty and both thresholds must be
    /// finite.
    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.min_distance.is_empty() {
            return Err(SegmentError::InvalidConfig {
                reason: "min_distance must list at least one radius".to_string(),
            });
        }
        if !self.threshold_rel.is_finite() || !self.threshold_abs.is_finite() {
            return Err(SegmentError::InvalidConfig {
                reason: format!(
                    "peak thresholds must be finite (rel={}, abs={})",
                    self.threshold_rel, self.threshold_abs
                ),
            });
        }
        Ok(())
    }

    /// Apply `overrides` on top of `self`.
    pub fn merged(&self, overrides: &PeakOverrides) -> Self {
        Self {
            min_distance: overrides
                .min_distance
                .clone()
                .unwrap_or_else(|| self.min_distance.clone()),
            threshold_rel: overrides.threshold_rel.unwrap_or(self.threshold_rel),
            threshold_abs: overrides.threshold_abs.unwrap_or(self.threshold_abs),
            max_peaks: overrides.max_peaks.or(self.max_peaks),
            overflow: overrides.overflow.unwrap_or(self.overflow),
        }
    }
}

/// Per-call overrides for [`PeakConfig`]. `None` keeps the base value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeakOverrides {
    /// Replacement radius list.
    pub min_distance: Option<Vec<usize>>,
    /// Replacement relative threshold.
    pub threshold_rel: Option<f64>,
    /// Replacement absolute threshold.
    pub threshold_abs: Option<f64>,
    /// Peak cap to impose.
    pub max_peaks: Option<usize>,
    /// Replacement overflow policy.
    pub overflow: Option<OverflowPolicy>,
}

// ── WatershedConfig ────────────────────────────────────────────────

/// Configuration for the watershed flood.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WatershedConfig {
    /// Neighbourhood order. `None` = full connectivity of the field.
    pub connectivity: Option<Connectivity>,
}

// ── MergeConfig ────────────────────────────────────────────────────

/// Configuration for [`FreeEnergy::merge_regions`](crate::free_energy::FreeEnergy::merge_regions).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergeConfig {
    /// Maximum number of regions to keep. `None` = no cap.
    pub max_regions: Option<usize>,
    /// Merges with cost at or below this value always happen. Default: 1.0.
    pub merge_threshold: f64,
    /// Keep merging above the threshold until `max_regions` is met.
    /// Default: `true`.
    pub force: bool,
    /// Convention of the output masks. Default: image.
    pub convention: MaskConvention,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            max_regions: None,
            merge_threshold: 1.0,
            force: true,
            convention: MaskConvention::Image,
        }
    }
}

impl MergeConfig {
    /// Reject a NaN threshold or a zero region cap.
    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.merge_threshold.is_nan() {
            return Err(SegmentError::InvalidConfig {
                reason: "merge_threshold is NaN".to_string(),
            });
        }
        if self.max_regions == Some(0) {
            return Err(SegmentError::InvalidConfig {
                reason: "max_regions must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply `overrides` on top of `self`.
    pub fn merged(&self, overrides: &MergeOverrides) -> Self {
        Self {
            max_regions: overrides.max_regions.or(self.max_regions),
            merge_threshold: overrides.merge_threshold.unwrap_or(self.merge_threshold),
            force: overrides.force.unwrap_or(self.force),
            convention: overrides.convention.unwrap_or(self.convention),
        }
    }
}

/// Per-call overrides for [`MergeConfig`]. `None` keeps the base value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MergeOverrides {
    /// Region cap to impose.
    pub max_regions: Option<usize>,
    /// Replacement threshold.
    pub merge_threshold: Option<f64>,
    /// Replacement force flag.
    pub force: Option<bool>,
    /// Replacement output convention.
    pub convention: Option<MaskConvention>,
}

// ── LabelsToMasks ──────────────────────────────────────────────────

/// Options for converting a label map into a list of region masks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelsToMasks {
    /// Labels to extract, in order. `None` = every positive label, ascending.
    pub features: Option<Vec<Label>>,
    /// Grow each mask by its outer boundary.
    pub include_boundary: bool,
    /// Neighbourhood used for the boundary. `None` = full connectivity.
    pub connectivity: Option<Connectivity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_policy_parses_case_insensitively() {
        assert_eq!("Raise".parse::<OverflowPolicy>(), Ok(OverflowPolicy::Raise));
        assert_eq!("ignore".parse::<OverflowPolicy>(), Ok(OverflowPolicy::Ignore));
        assert_eq!(
            "explode".parse::<OverflowPolicy>(),
            Err(SegmentError::UnknownOverflowPolicy {
                name: "explode".to_string()
            })
        );
        assert_eq!(OverflowPolicy::Warn.to_string(), "warn");
    }

    #[test]
    fn peak_overrides_replace_only_set_fields() {
        let base = PeakConfig::default();
        let merged = base.merged(&PeakOverrides {
            max_peaks: Some(3),
            threshold_abs: Some(0.5),
            ..Default::default()
        });
        assert_eq!(merged.max_peaks, Some(3));
        assert_eq!(merged.threshold_abs, 0.5);
        assert_eq!(merged.min_distance, DEFAULT_MIN_DISTANCE.to_vec());
        assert_eq!(merged.overflow, OverflowPolicy::Warn);
    }

    #[test]
    fn peak_config_validation() {
        assert!(PeakConfig::default().validate().is_ok());
        let empty = PeakConfig {
            min_distance: vec![],
            ..Default::default()
        };
        assert!(matches!(
            empty.validate(),
            Err(SegmentError::InvalidConfig { .. })
        ));
        let nan = PeakConfig {
            threshold_rel: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn merge_defaults_and_overrides() {
        let base = MergeConfig::default();
        assert_eq!(base.merge_threshold, 1.0);
        assert!(base.force);
        assert!(base.validate().is_ok());

        let merged = base.merged(&MergeOverrides {
            force: Some(false),
            max_regions: Some(2),
            ..Default::default()
        });
        assert!(!merged.force);
        assert_eq!(merged.max_regions, Some(2));
        assert_eq!(merged.merge_threshold, 1.0);

        let zero = MergeConfig {
            max_regions: Some(0),
            ..base
        };
        assert!(zero.validate().is_err());
    }
}
