//! Binary morphology and grey-level maximum filtering on flat buffers.
//!
//! Every operation walks the lattice through a [`Neighbourhood`], so the
//! same code serves 1D, 2D and 3D landscapes at any connectivity order.
//! Out-of-bounds neighbours are absent, which matches reflect-mode edge
//! handling for boolean inputs: the border never introduces a new value.

use crate::connectivity::Neighbourhood;
use crate::error::SpaceError;
use crate::grid::Grid;

/// Which side of a region edge [`find_boundaries`] reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoundaryMode {
    /// Cells on both sides of the edge.
    #[default]
    Thick,
    /// Only edge cells outside the region.
    Outer,
}

/// Locate the boundary of a binary mask.
///
/// A cell is on the thick boundary iff its closed neighbourhood contains
/// both set and unset cells. [`BoundaryMode::Outer`] keeps only the unset
/// half, the cells a region grows into.
///
/// # Examples
///
/// ```
/// use lnpi_space::{find_boundaries, BoundaryMode, Connectivity, Grid, Neighbourhood};
///
/// let grid = Grid::new(&[6]).unwrap();
/// let nbhd = Neighbourhood::new(&grid, Connectivity::FACE);
/// let mask = [true, true, true, false, false, false];
/// let thick = find_boundaries(&mask, &nbhd, BoundaryMode::Thick).unwrap();
/// assert_eq!(thick, vec![false, false, true, true, false, false]);
/// ```
pub fn find_boundaries(
    mask: &[bool],
    nbhd: &Neighbourhood,
    mode: BoundaryMode,
) -> Result<Vec<bool>, SpaceError> {
    nbhd.grid().check_len(mask.len())?;
    Ok((0..mask.len())
        .map(|rank| {
            let inside = mask[rank];
            let keep = match mode {
                BoundaryMode::Thick => true,
                BoundaryMode::Outer => !inside,
            };
            keep && nbhd.neighbours(rank).iter().any(|&nb| mask[nb] != inside)
        })
        .collect())
}

/// Maximum over the hyper-cubic window of half-width `radius` around every
/// cell, considering only cells where `include` is set.
///
/// NaN values and excluded cells contribute `-inf`. The filter is applied
/// separably, one axis at a time.
pub fn grey_max_filter(
    values: &[f64],
    include: &[bool],
    grid: &Grid,
    radius: usize,
) -> Result<Vec<f64>, SpaceError> {
    grid.check_len(values.len())?;
    grid.check_len(include.len())?;

    let mut out: Vec<f64> = values
        .iter()
        .zip(include)
        .map(|(&v, &inc)| if inc && !v.is_nan() { v } else { f64::NEG_INFINITY })
        .collect();
    if radius == 0 {
        return Ok(out);
    }

    let mut scratch = vec![f64::NEG_INFINITY; out.len()];
    for axis in 0..grid.ndim() {
        let len = grid.shape()[axis];
        let stride = grid.strides()[axis];
        for (rank, slot) in scratch.iter_mut().enumerate() {
            let index = grid.axis_index(rank, axis);
            let lo = index.saturating_sub(radius);
            let hi = (index + radius).min(len - 1);
            let base = rank - index * stride;
            *slot = (lo..=hi)
                .map(|k| out[base + k * stride])
                .fold(f64::NEG_INFINITY, f64::max);
        }
        std::mem::swap(&mut out, &mut scratch);
    }
    Ok(out)
}
