//! Collaborator trait for lnPi containers.

use ndarray::ArrayViewD;

use crate::mask::{Mask, MaskConvention};

/// An lnPi container consumed by the phase assembler.
///
/// The container owns the landscape, knows how to reweight itself to new
/// chemical potentials, and materialises sub-regions as new containers.
/// Segmentation only reads it through this trait.
///
/// Note the mask convention: [`mask`](Self::mask) follows the masked-array
/// convention, so `true` marks an *excluded* cell. This is the opposite of
/// the internal image convention used by every segmentation stage.
pub trait LnPi: Sized {
    /// The lnPi values.
    fn data(&self) -> ArrayViewD<'_, f64>;

    /// Excluded cells (`true` = outside the valid domain).
    fn mask(&self) -> ArrayViewD<'_, bool>;

    /// Reweight to a new vector of log-activities `lnz`.
    fn reweight(&self, lnz: &[f64]) -> Self;

    /// Build one container per mask, restricting this container's domain.
    ///
    /// `convention` states how the supplied masks should be read.
    fn list_from_masks(&self, masks: &[Mask], convention: MaskConvention) -> Vec<Self>;
}
