//! The [`PhaseCreator`]: reference lnPi in, tagged phases out.
//!
//! One [`build_phases`](PhaseCreator::build_phases) call runs the whole
//! pipeline:
//!
//! 1. reweight the reference to the requested `lnz`,
//! 2. segment it around at most `nmax_peak` maxima,
//! 3. merge regions across low free-energy barriers down to `nmax`,
//! 4. materialise one lnPi per region,
//! 5. tag the phases and union those sharing a tag.
//!
//! Constructed via the builder pattern: [`PhaseCreator::builder`].

use std::fmt;

use indexmap::IndexMap;
use lnpi_core::{Field, LnPi, Mask, MaskConvention, PhaseTag};
use lnpi_segment::{FreeEnergy, LabelsToMasks, MergeConfig, SegmentRequest, Segmenter};
use lnpi_space::Connectivity;

use crate::collection::PhaseSet;
use crate::config::{BuildRequest, PhaseCreatorConfig};
use crate::error::PhaseError;
use crate::scan::{PhaseScan, ScanAxis};

/// Assigns a tag to each phase of a candidate set.
pub type TagFn<T> = Box<dyn Fn(&[T]) -> Vec<PhaseTag>>;

/// Builds phases from a reference lnPi.
pub struct PhaseCreator<T> {
    config: PhaseCreatorConfig,
    reference: Option<T>,
    segmenter: Segmenter,
    tag_phases: Option<TagFn<T>>,
}

impl<T> fmt::Debug for PhaseCreator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseCreator")
            .field("config", &self.config)
            .field("has_reference", &self.reference.is_some())
            .field("segmenter", &self.segmenter)
            .field("has_tag_phases", &self.tag_phases.is_some())
            .finish()
    }
}

/// Builder for [`PhaseCreator`].
///
/// Required field: `nmax`.
pub struct PhaseCreatorBuilder<T> {
    nmax: Option<usize>,
    config: PhaseCreatorConfig,
    reference: Option<T>,
    segmenter: Segmenter,
    tag_phases: Option<TagFn<T>>,
}

impl<T: LnPi + Clone> PhaseCreator<T> {
    /// Create a new builder for configuring a `PhaseCreator`.
    pub fn builder() -> PhaseCreatorBuilder<T> {
        PhaseCreatorBuilder {
            nmax: None,
            config: PhaseCreatorConfig::default(),
            reference: None,
            segmenter: Segmenter::default(),
            tag_phases: None,
        }
    }

    /// The creator's defaults.
    pub fn config(&self) -> &PhaseCreatorConfig {
        &self.config
    }

    /// The configured reference lnPi, if any.
    pub fn reference(&self) -> Option<&T> {
        self.reference.as_ref()
    }

    /// The segmenter used for every build.
    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    /// Build phases with the creator's defaults.
    pub fn build(&self) -> Result<PhaseSet<T>, PhaseError> {
        self.build_phases(&BuildRequest::new())
    }

    /// Build phases, applying `request` on top of the creator's defaults.
    ///
    /// A landscape with no cell above the peak threshold yields an empty
    /// set. Peak overflow and incomplete merging are reported on
    /// [`PhaseSet::warnings`].
    ///
    /// # Errors
    ///
    /// - [`PhaseError::Configuration`] if there is no reference lnPi or
    ///   the merged configuration is invalid.
    /// - [`PhaseError::Segment`] if any segmentation stage fails.
    /// - [`PhaseError::TagCount`] if the tag function miscounts.
    pub fn build_phases(&self, request: &BuildRequest<'_, T>) -> Result<PhaseSet<T>, PhaseError> {
        let config = self.config.merged(request);
        config.validate()?;

        let base = request
            .reference
            .or(self.reference.as_ref())
            .ok_or_else(|| PhaseError::Configuration {
                reason: "no reference lnPi given or configured".to_string(),
            })?;
        let reweighted = request.lnz.map(|lnz| base.reweight(lnz));
        let reference = reweighted.as_ref().unwrap_or(base);

        if config.nmax == 1 {
            return Ok(PhaseSet::positional(vec![reference.clone()]));
        }

        let field = Field::from_lnpi(reference)?;
        let segmentation = self.segmenter.segment(
            &field,
            &SegmentRequest {
                max_peaks: Some(config.resolved_nmax_peak()),
                connectivity: config.connectivity,
                ..Default::default()
            },
        )?;
        let mut warnings = segmentation.warnings;
        if segmentation.labels.iter().all(|&label| label == 0) {
            tracing::debug!("no seeds above threshold, no phases built");
            return Ok(PhaseSet::positional(Vec::new()).with_warnings(warnings));
        }

        let estimator = FreeEnergy::from_labels(
            &field,
            &segmentation.labels,
            &LabelsToMasks {
                connectivity: config.connectivity,
                ..Default::default()
            },
        )?;
        let masks = if config.merge_regions {
            let merge = MergeConfig {
                max_regions: Some(config.nmax),
                convention: MaskConvention::Image,
                ..config.merge
            };
            let outcome = estimator.merge_regions(&merge)?;
            warnings.extend(outcome.warnings);
            outcome.masks
        } else {
            estimator.masks().to_vec()
        };
        tracing::debug!(
            seeds = segmentation.seeds,
            regions = masks.len(),
            "phases segmented"
        );
        let phases = reference.list_from_masks(&masks, MaskConvention::Image);

        let set = match &self.tag_phases {
            None => PhaseSet::positional(phases),
            Some(tag) => {
                let tags = tag(&phases);
                if tags.len() != phases.len() {
                    return Err(PhaseError::TagCount {
                        expected: phases.len(),
                        got: tags.len(),
                    });
                }
                if config.merge_tagged {
                    merge_tagged(reference, tags, phases)?
                } else {
                    PhaseSet::new(phases, tags)?
                }
            }
        };
        Ok(set.with_warnings(warnings))
    }

    /// A scan over one lnz component.
    pub fn scan(&self, axis: ScanAxis) -> PhaseScan<'_, T> {
        PhaseScan::new(self, axis)
    }
}

/// Union phases sharing a tag into one phase per distinct tag, ascending.
///
/// Returned unchanged when there is a single phase or every tag is distinct.
fn merge_tagged<T: LnPi>(
    reference: &T,
    tags: Vec<PhaseTag>,
    phases: Vec<T>,
) -> Result<PhaseSet<T>, PhaseError> {
    let mut groups: IndexMap<PhaseTag, Mask> = IndexMap::new();
    for (tag, phase) in tags.iter().zip(&phases) {
        let domain = phase.mask().mapv(|excluded| !excluded);
        match groups.get_mut(tag) {
            Some(union) => union.zip_mut_with(&domain, |u, &d| *u |= d),
            None => {
                groups.insert(*tag, domain);
            }
        }
    }
    if phases.len() == 1 || groups.len() == phases.len() {
        return PhaseSet::new(phases, tags);
    }

    groups.sort_keys();
    tracing::debug!(phases = phases.len(), tags = groups.len(), "merging tagged phases");
    let (index, masks): (Vec<PhaseTag>, Vec<Mask>) = groups.into_iter().unzip();
    let merged = reference.list_from_masks(&masks, MaskConvention::Image);
    PhaseSet::new(merged, index)
}

impl<T: LnPi + Clone> PhaseCreatorBuilder<T> {
    /// Set the maximum number of phases (required).
    pub fn nmax(mut self, nmax: usize) -> Self {
        self.nmax = Some(nmax);
        self
    }

    /// Set the peak cap (default: `2 * nmax`).
    pub fn nmax_peak(mut self, nmax_peak: usize) -> Self {
        self.config.nmax_peak = Some(nmax_peak);
        self
    }

    /// Set the default reference lnPi.
    pub fn reference(mut self, reference: T) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Set the segmenter (default: [`Segmenter::default`]).
    pub fn segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Set the merge configuration. `max_regions` is always replaced by `nmax`.
    pub fn merge(mut self, merge: MergeConfig) -> Self {
        self.config.merge = merge;
        self
    }

    /// Set the neighbourhood order (default: full connectivity).
    pub fn connectivity(mut self, connectivity: Connectivity) -> Self {
        self.config.connectivity = Some(connectivity);
        self
    }

    /// Skip region merging when `false` (default: `true`).
    pub fn merge_regions(mut self, merge: bool) -> Self {
        self.config.merge_regions = merge;
        self
    }

    /// Keep same-tag phases apart when `false` (default: `true`).
    pub fn merge_tagged(mut self, merge: bool) -> Self {
        self.config.merge_tagged = merge;
        self
    }

    /// Set the function that tags candidate phases.
    pub fn tag_phases<F>(mut self, tag: F) -> Self
    where
        F: Fn(&[T]) -> Vec<PhaseTag> + 'static,
    {
        self.tag_phases = Some(Box::new(tag));
        self
    }

    /// Build the creator, validating the configuration.
    ///
    /// # Errors
    ///
    /// [`PhaseError::Configuration`] if `nmax` is unset or the
    /// configuration fails [`PhaseCreatorConfig::validate`].
    pub fn build(self) -> Result<PhaseCreator<T>, PhaseError> {
        let nmax = self.nmax.ok_or_else(|| PhaseError::Configuration {
            reason: "nmax is required".to_string(),
        })?;
        let config = PhaseCreatorConfig { nmax, ..self.config };
        config.validate()?;
        self.segmenter.peak.validate()?;
        Ok(PhaseCreator {
            config,
            reference: self.reference,
            segmenter: self.segmenter,
            tag_phases: self.tag_phases,
        })
    }
}
