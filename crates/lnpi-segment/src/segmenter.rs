//! The [`Segmenter`]: peak finding composed with watershed.

use lnpi_core::{Field, LabelMap, LnPi};
use lnpi_space::Connectivity;

use crate::config::{PeakConfig, PeakOverrides, WatershedConfig};
use crate::error::{SegmentError, SegmentWarning};
use crate::peaks::{find_peaks_adaptive, strongest_peaks, Peaks};
use crate::watershed::{watershed, Markers};

/// Per-call options for [`Segmenter::segment`].
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentRequest {
    /// Seed the flood with [`find_peaks_adaptive`]. When `false`,
    /// `max_peaks` is used directly as a [`Markers::Count`]. Default: `true`.
    pub run_peak_finder: bool,
    /// Peak cap for this call.
    pub max_peaks: Option<usize>,
    /// Neighbourhood order for labeling seeds and flooding.
    pub connectivity: Option<Connectivity>,
    /// Further peak-finder overrides.
    pub peaks: PeakOverrides,
}

impl Default for SegmentRequest {
    fn default() -> Self {
        Self {
            run_peak_finder: true,
            max_peaks: None,
            connectivity: None,
            peaks: PeakOverrides::default(),
        }
    }
}

/// Result of [`Segmenter::segment`].
#[derive(Clone, Debug, PartialEq)]
pub struct Segmentation {
    /// Region labels, 0 outside every region.
    pub labels: LabelMap,
    /// Number of seeds the flood started from.
    pub seeds: usize,
    /// Warnings raised by the peak finder.
    pub warnings: Vec<SegmentWarning>,
}

/// Splits an lnPi landscape into watershed regions around its maxima.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segmenter {
    /// Base peak-finder configuration.
    pub peak: PeakConfig,
    /// Base watershed configuration.
    pub watershed: WatershedConfig,
}

impl Segmenter {
    /// Create a segmenter from stage configs.
    pub fn new(peak: PeakConfig, watershed: WatershedConfig) -> Self {
        Self { peak, watershed }
    }

    /// Locate peaks with the base config plus `overrides`.
    pub fn peaks(&self, field: &Field, overrides: &PeakOverrides) -> Result<Peaks, SegmentError> {
        find_peaks_adaptive(field, &self.peak.merged(overrides))
    }

    /// Resolve `markers` into seed labels and flood.
    pub fn watershed(
        &self,
        field: &Field,
        markers: &Markers,
        connectivity: Option<Connectivity>,
    ) -> Result<LabelMap, SegmentError> {
        let connectivity = connectivity.or(self.watershed.connectivity);
        let seeds = self.seed_labels(field, markers, connectivity)?;
        watershed(field, &seeds, connectivity)
    }

    /// Segment `field` into labelled regions.
    ///
    /// # Errors
    ///
    /// - [`SegmentError::InvalidConfig`] if the peak finder is skipped and
    ///   no `max_peaks` is given.
    /// - Anything [`find_peaks_adaptive`] or [`watershed`] returns.
    pub fn segment(
        &self,
        field: &Field,
        request: &SegmentRequest,
    ) -> Result<Segmentation, SegmentError> {
        let connectivity = request.connectivity.or(self.watershed.connectivity);

        let (seeds, warnings) = if request.run_peak_finder {
            let mut overrides = request.peaks.clone();
            overrides.max_peaks = request.max_peaks.or(overrides.max_peaks);
            let peaks = self.peaks(field, &overrides)?;
            (peaks.to_markers(connectivity)?, peaks.warnings().to_vec())
        } else {
            let count = request.max_peaks.ok_or_else(|| SegmentError::InvalidConfig {
                reason: "max_peaks is required as the marker count when the peak finder is skipped"
                    .to_string(),
            })?;
            (
                self.seed_labels(field, &Markers::Count(count), connectivity)?,
                Vec::new(),
            )
        };

        let seed_count = seeds.iter().filter(|&&l| l != 0).count();
        let labels = watershed(field, &seeds, connectivity)?;
        tracing::debug!(seeds = seed_count, "segmentation done");
        Ok(Segmentation {
            labels,
            seeds: seed_count,
            warnings,
        })
    }

    /// Segment an lnPi container, reading its masked-array domain.
    pub fn segment_lnpi<T: LnPi>(
        &self,
        lnpi: &T,
        request: &SegmentRequest,
    ) -> Result<Segmentation, SegmentError> {
        let field = Field::from_lnpi(lnpi)?;
        self.segment(&field, request)
    }

    fn seed_labels(
        &self,
        field: &Field,
        markers: &Markers,
        connectivity: Option<Connectivity>,
    ) -> Result<LabelMap, SegmentError> {
        match markers {
            Markers::Count(n) => strongest_peaks(field, &self.peak, *n)?.to_markers(connectivity),
            Markers::Labels(map) => Ok(map.clone()),
        }
    }
}
