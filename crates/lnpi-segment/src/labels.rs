//! Label map to mask list conversion.

use lnpi_core::{change_convention, Label, LabelMap, Mask, MaskConvention};
use lnpi_space::{find_boundaries, BoundaryMode, Grid};

use crate::config::LabelsToMasks;
use crate::error::SegmentError;
use crate::grid_helpers::{mask_from_flat, neighbourhood};

/// Masks extracted from a label map, with the label each came from.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionMasks {
    /// One mask per feature, in the requested convention.
    pub masks: Vec<Mask>,
    /// The label of each mask.
    pub features: Vec<Label>,
}

/// Distinct positive labels in ascending order.
pub fn unique_features(labels: &LabelMap) -> Vec<Label> {
    let mut features: Vec<Label> = labels.iter().copied().filter(|&l| l > 0).collect();
    features.sort_unstable();
    features.dedup();
    features
}

/// Split a label map into one mask per feature.
///
/// With `include_boundary`, each mask is grown by its outer boundary so
/// cells on the edge between regions belong to both neighbours.
pub fn labels_to_masks(
    labels: &LabelMap,
    options: &LabelsToMasks,
    convention: MaskConvention,
) -> Result<RegionMasks, SegmentError> {
    let features = match &options.features {
        Some(f) => f.clone(),
        None => unique_features(labels),
    };

    let grid = Grid::new(labels.shape())?;
    let nbhd = neighbourhood(&grid, options.connectivity);

    let mut masks = Vec::with_capacity(features.len());
    for &feature in &features {
        let mut flat: Vec<bool> = labels.iter().map(|&l| l == feature).collect();
        if options.include_boundary {
            let outer = find_boundaries(&flat, &nbhd, BoundaryMode::Outer)?;
            for (m, o) in flat.iter_mut().zip(outer) {
                *m |= o;
            }
        }
        let mask = mask_from_flat(labels.shape(), flat)?;
        masks.push(change_convention(&mask, MaskConvention::Image, convention));
    }

    Ok(RegionMasks { masks, features })
}
