//! Region masks, label maps, and mask convention conversion.
//!
//! Internally every mask uses the *image* convention: `true` marks a
//! cell that belongs to the region. The lnPi container stores its domain
//! in the *masked-array* convention (`true` = excluded), so masks are
//! converted with [`change_convention`] whenever they cross that boundary.

use std::str::FromStr;

use ndarray::ArrayD;

use crate::error::FieldError;
use crate::id::Label;

/// Boolean region mask, same shape as the field.
pub type Mask = ArrayD<bool>;

/// Integer label map: `0` = unlabeled, positive = region id.
pub type LabelMap = ArrayD<Label>;

/// Meaning of `true` in a boolean mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaskConvention {
    /// `true` = the cell is part of the region (image convention).
    #[default]
    Image,
    /// `true` = the cell is excluded (masked-array convention).
    Masked,
}

impl MaskConvention {
    /// Whether a mask value marks the cell as included under this convention.
    #[inline]
    pub fn includes(self, value: bool) -> bool {
        match self {
            Self::Image => value,
            Self::Masked => !value,
        }
    }
}

/// `true` selects the image convention, `false` the masked-array convention.
impl From<bool> for MaskConvention {
    fn from(image: bool) -> Self {
        if image {
            Self::Image
        } else {
            Self::Masked
        }
    }
}

impl FromStr for MaskConvention {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "masked" => Ok(Self::Masked),
            other => Err(FieldError::UnknownConvention {
                name: other.to_string(),
            }),
        }
    }
}

/// Convert a mask from one convention to another.
///
/// Returns a fresh array; the input is never modified.
pub fn change_convention(mask: &Mask, from: MaskConvention, to: MaskConvention) -> Mask {
    if from == to {
        mask.clone()
    } else {
        mask.mapv(|v| !v)
    }
}

/// Convert every mask in a list from one convention to another.
pub fn masks_change_convention(
    masks: &[Mask],
    from: MaskConvention,
    to: MaskConvention,
) -> Vec<Mask> {
    masks
        .iter()
        .map(|m| change_convention(m, from, to))
        .collect()
}

/// Build a label map from a list of masks.
///
/// Mask `i` is written with `features[i]` (or `i + 1` when `features` is
/// `None`). Where masks overlap, later masks win.
///
/// # Errors
///
/// - [`FieldError::NoMasks`] if `masks` is empty.
/// - [`FieldError::ShapeMismatch`] if the masks differ in shape.
/// - [`FieldError::FeatureCount`] if `features` has the wrong length.
pub fn masks_to_labels(
    masks: &[Mask],
    features: Option<&[Label]>,
    convention: MaskConvention,
) -> Result<LabelMap, FieldError> {
    let first = masks.first().ok_or(FieldError::NoMasks)?;
    if let Some(features) = features {
        if features.len() != masks.len() {
            return Err(FieldError::FeatureCount {
                masks: masks.len(),
                features: features.len(),
            });
        }
    }

    let mut labels = LabelMap::zeros(first.raw_dim());
    for (i, mask) in masks.iter().enumerate() {
        if mask.shape() != first.shape() {
            return Err(FieldError::ShapeMismatch {
                expected: first.shape().to_vec(),
                got: mask.shape().to_vec(),
            });
        }
        let feature = features.map_or(i as Label + 1, |f| f[i]);
        labels.zip_mut_with(mask, |l, &m| {
            if convention.includes(m) {
                *l = feature;
            }
        });
    }
    Ok(labels)
}
