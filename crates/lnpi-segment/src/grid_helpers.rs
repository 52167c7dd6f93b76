//! Shared conversions between `ndarray` values and flat lattice buffers.
//!
//! Every stage works on row-major flat slices indexed by lattice rank and
//! only goes back to `ArrayD` at its public boundary. Centralised here so
//! shape handling lives in one place.

use lnpi_core::{Field, LabelMap, Mask};
use lnpi_space::{Connectivity, Grid, Neighbourhood};
use ndarray::{ArrayD, IxDyn};

use crate::error::SegmentError;

/// Lattice matching the field's shape.
pub(crate) fn grid_of(field: &Field) -> Result<Grid, SegmentError> {
    Ok(Grid::new(field.shape())?)
}

/// Neighbourhood on `grid`, defaulting to full connectivity.
pub(crate) fn neighbourhood(grid: &Grid, connectivity: Option<Connectivity>) -> Neighbourhood {
    let connectivity = connectivity.unwrap_or_else(|| Connectivity::full(grid.ndim()));
    Neighbourhood::new(grid, connectivity)
}

/// Check that `shape` is the field's shape.
pub(crate) fn check_shape(field: &Field, shape: &[usize]) -> Result<(), SegmentError> {
    field.check_shape(shape)?;
    Ok(())
}

/// Flatten an array in row-major order.
pub(crate) fn flatten<T: Copy>(array: &ArrayD<T>) -> Vec<T> {
    array.iter().copied().collect()
}

/// Rebuild an array of `shape` from a row-major buffer.
pub(crate) fn unflatten<T>(shape: &[usize], values: Vec<T>) -> Result<ArrayD<T>, SegmentError> {
    let got = values.len();
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| SegmentError::ShapeMismatch {
        expected: shape.to_vec(),
        got: vec![got],
    })
}

/// Rebuild a mask from a row-major buffer.
pub(crate) fn mask_from_flat(shape: &[usize], values: Vec<bool>) -> Result<Mask, SegmentError> {
    unflatten(shape, values)
}

/// Rebuild a label map from a row-major buffer.
pub(crate) fn labels_from_flat(
    shape: &[usize],
    values: Vec<lnpi_core::Label>,
) -> Result<LabelMap, SegmentError> {
    unflatten(shape, values)
}

/// Maximum over the selected cells, ignoring NaN. `-inf` when nothing is
/// selected or every selected value is NaN.
pub(crate) fn nan_max<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(f64::NEG_INFINITY, f64::max)
}
