//! The [`Field`] landscape: lnPi values plus a domain mask.

use ndarray::{Array1, ArrayD};

use crate::error::FieldError;
use crate::mask::{change_convention, Mask, MaskConvention};
use crate::traits::LnPi;

/// An n-dimensional lnPi landscape with its valid domain.
///
/// The domain is stored in the image convention: `true` marks cells that
/// take part in segmentation. Cells outside the domain (unphysical or
/// unsampled macrostates) are never assigned to any region.
///
/// A `Field` is read-only once constructed; every pipeline stage borrows it.
///
/// # Examples
///
/// ```
/// use lnpi_core::Field;
///
/// let field = Field::from_vec(vec![0.0, 1.0, 2.0, 1.0, 0.0]).unwrap();
/// assert_eq!(field.shape(), &[5]);
/// assert!(field.domain().iter().all(|&d| d));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    data: ArrayD<f64>,
    domain: Mask,
}

impl Field {
    /// Create a field whose domain covers every cell.
    ///
    /// Returns `Err(FieldError::EmptyField)` if `data` has no cells.
    pub fn new(data: ArrayD<f64>) -> Result<Self, FieldError> {
        if data.is_empty() {
            return Err(FieldError::EmptyField);
        }
        let domain = Mask::from_elem(data.raw_dim(), true);
        Ok(Self { data, domain })
    }

    /// Create a one-dimensional field from a vector of values.
    pub fn from_vec(values: Vec<f64>) -> Result<Self, FieldError> {
        Self::new(Array1::from(values).into_dyn())
    }

    /// Create a field with an explicit domain mask (image convention).
    pub fn with_domain(data: ArrayD<f64>, domain: Mask) -> Result<Self, FieldError> {
        Self::with_mask(data, domain, MaskConvention::Image)
    }

    /// Create a field from a domain mask in the given convention.
    ///
    /// # Errors
    ///
    /// - [`FieldError::EmptyField`] if `data` has no cells.
    /// - [`FieldError::ShapeMismatch`] if `mask` and `data` differ in shape.
    pub fn with_mask(
        data: ArrayD<f64>,
        mask: Mask,
        convention: MaskConvention,
    ) -> Result<Self, FieldError> {
        if data.is_empty() {
            return Err(FieldError::EmptyField);
        }
        if mask.shape() != data.shape() {
            return Err(FieldError::ShapeMismatch {
                expected: data.shape().to_vec(),
                got: mask.shape().to_vec(),
            });
        }
        let domain = change_convention(&mask, convention, MaskConvention::Image);
        Ok(Self { data, domain })
    }

    /// Snapshot an lnPi container into a field.
    ///
    /// The container's mask uses the masked-array convention and is
    /// inverted on the way in.
    pub fn from_lnpi<T: LnPi>(lnpi: &T) -> Result<Self, FieldError> {
        Self::with_mask(
            lnpi.data().to_owned(),
            lnpi.mask().to_owned(),
            MaskConvention::Masked,
        )
    }

    /// The lnPi values.
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// The domain mask (image convention).
    pub fn domain(&self) -> &Mask {
        &self.domain
    }

    /// Array shape.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: construction rejects empty data.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of cells inside the domain.
    pub fn domain_count(&self) -> usize {
        self.domain.iter().filter(|&&d| d).count()
    }

    /// Values flattened in row-major order.
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Domain flags flattened in row-major order.
    pub fn domain_values(&self) -> Vec<bool> {
        self.domain.iter().copied().collect()
    }

    /// Check that `shape` matches the field's shape.
    pub fn check_shape(&self, shape: &[usize]) -> Result<(), FieldError> {
        if shape != self.shape() {
            return Err(FieldError::ShapeMismatch {
                expected: self.shape().to_vec(),
                got: shape.to_vec(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn new_covers_whole_domain() {
        let field = Field::new(arr2(&[[0.0, 1.0], [2.0, 3.0]]).into_dyn()).unwrap();
        assert_eq!(field.ndim(), 2);
        assert_eq!(field.len(), 4);
        assert_eq!(field.domain_count(), 4);
        assert_eq!(field.values(), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_data_rejected() {
        assert_eq!(Field::from_vec(vec![]), Err(FieldError::EmptyField));
    }

    #[test]
    fn masked_convention_is_inverted() {
        let data = arr1(&[0.0, 1.0, 2.0]).into_dyn();
        let excluded = arr1(&[true, false, false]).into_dyn();
        let field = Field::with_mask(data, excluded, MaskConvention::Masked).unwrap();
        assert_eq!(field.domain_values(), vec![false, true, true]);
        assert_eq!(field.domain_count(), 2);
    }

    #[test]
    fn shape_mismatch_rejected() {
        let data = arr1(&[0.0, 1.0, 2.0]).into_dyn();
        let domain = arr1(&[true, false]).into_dyn();
        assert!(matches!(
            Field::with_domain(data, domain),
            Err(FieldError::ShapeMismatch { .. })
        ));
    }
}
