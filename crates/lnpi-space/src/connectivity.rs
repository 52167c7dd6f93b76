//! Connectivity orders and precomputed neighbourhoods.

use crate::error::SpaceError;
use crate::grid::Grid;
use smallvec::SmallVec;

/// Maximum number of axes along which two neighbouring cells may differ.
///
/// Order 1 gives face neighbours only (2 per axis); order `ndim` gives the
/// full `3^ndim - 1` neighbourhood including every diagonal. Orders above
/// the grid's dimensionality are clamped when a [`Neighbourhood`] is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connectivity(usize);

impl Connectivity {
    /// Face-only connectivity (order 1).
    pub const FACE: Self = Self(1);

    /// Create a connectivity of the given order.
    ///
    /// Returns `Err(SpaceError::InvalidConnectivity)` if `order == 0`.
    pub fn new(order: usize) -> Result<Self, SpaceError> {
        if order == 0 {
            return Err(SpaceError::InvalidConnectivity { order });
        }
        Ok(Self(order))
    }

    /// Full connectivity for an `ndim`-dimensional lattice.
    pub fn full(ndim: usize) -> Self {
        Self(ndim.max(1))
    }

    /// The requested order.
    pub fn order(self) -> usize {
        self.0
    }

    /// Order clamped into `1..=ndim`.
    pub fn resolve(self, ndim: usize) -> usize {
        self.0.clamp(1, ndim.max(1))
    }
}

/// Precomputed neighbour offsets for a grid and connectivity.
///
/// Neighbours are produced in a fixed offset order (lexicographic over
/// `{-1, 0, 1}^ndim`), so every traversal built on top is deterministic.
#[derive(Debug, Clone)]
pub struct Neighbourhood {
    grid: Grid,
    order: usize,
    offsets: Vec<SmallVec<[isize; 4]>>,
}

impl Neighbourhood {
    /// Build the neighbourhood of `connectivity` on `grid`.
    pub fn new(grid: &Grid, connectivity: Connectivity) -> Self {
        let ndim = grid.ndim();
        let order = connectivity.resolve(ndim);

        let mut offsets = Vec::new();
        let total = 3usize.pow(ndim as u32);
        for code in 0..total {
            let mut offset: SmallVec<[isize; 4]> = SmallVec::with_capacity(ndim);
            let mut rest = code;
            for _ in 0..ndim {
                offset.push((rest % 3) as isize - 1);
                rest /= 3;
            }
            offset.reverse();
            let nonzero = offset.iter().filter(|&&d| d != 0).count();
            if nonzero > 0 && nonzero <= order {
                offsets.push(offset);
            }
        }

        Self {
            grid: grid.clone(),
            order,
            offsets,
        }
    }

    /// The underlying grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Effective connectivity order after clamping.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Neighbour count of an interior cell.
    pub fn max_neighbour_degree(&self) -> usize {
        self.offsets.len()
    }

    /// In-bounds neighbours of the cell at `rank`, in offset order.
    pub fn neighbours(&self, rank: usize) -> SmallVec<[usize; 8]> {
        let shape = self.grid.shape();
        let strides = self.grid.strides();
        let mut out = SmallVec::new();
        'offsets: for offset in &self.offsets {
            let mut target = rank;
            for (axis, &delta) in offset.iter().enumerate() {
                if delta == 0 {
                    continue;
                }
                let index = self.grid.axis_index(rank, axis);
                if delta < 0 {
                    if index == 0 {
                        continue 'offsets;
                    }
                    target -= strides[axis];
                } else {
                    if index + 1 >= shape[axis] {
                        continue 'offsets;
                    }
                    target += strides[axis];
                }
            }
            out.push(target);
        }
        out
    }
}
