//! N-dimensional row-major lattice.

use crate::error::SpaceError;
use lnpi_core::Coord;
use smallvec::SmallVec;

/// An n-dimensional rectangular lattice in row-major (C) order.
///
/// Each cell has coordinate `[i_0, i_1, ..., i_{n-1}]` with
/// `0 <= i_k < shape[k]`. The last axis varies fastest in the canonical
/// ordering, matching the memory order of a standard-layout `ndarray`.
/// Edges absorb: cells on the border simply have fewer neighbours.
///
/// # Examples
///
/// ```
/// use lnpi_space::Grid;
///
/// let grid = Grid::new(&[3, 4]).unwrap();
/// assert_eq!(grid.cell_count(), 12);
/// assert_eq!(grid.rank_of(&[2, 1]), Some(9));
/// assert_eq!(grid.coord_of(9).as_slice(), &[2, 1]);
/// assert_eq!(grid.rank_of(&[3, 0]), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    shape: SmallVec<[usize; 4]>,
    strides: SmallVec<[usize; 4]>,
    cell_count: usize,
}

impl Grid {
    /// Create a lattice with the given shape.
    ///
    /// Returns `Err(SpaceError::InvalidShape)` for a zero-dimensional shape
    /// or an overflowing cell count, and `Err(SpaceError::EmptySpace)` if
    /// any axis has length 0.
    pub fn new(shape: &[usize]) -> Result<Self, SpaceError> {
        if shape.is_empty() {
            return Err(SpaceError::InvalidShape {
                reason: "grid needs at least one axis".to_string(),
            });
        }
        if shape.contains(&0) {
            return Err(SpaceError::EmptySpace);
        }

        let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, shape.len());
        let mut cell_count: usize = 1;
        for axis in (0..shape.len()).rev() {
            strides[axis] = cell_count;
            cell_count =
                cell_count
                    .checked_mul(shape[axis])
                    .ok_or_else(|| SpaceError::InvalidShape {
                        reason: "total cell count overflows usize".to_string(),
                    })?;
        }

        Ok(Self {
            shape: SmallVec::from_slice(shape),
            strides,
            cell_count,
        })
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Length of every axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Rank distance between consecutive cells along each axis.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Coordinate of the cell at canonical position `rank`.
    ///
    /// `rank` must be `< cell_count()`.
    pub fn coord_of(&self, rank: usize) -> Coord {
        debug_assert!(rank < self.cell_count, "rank {rank} out of bounds");
        self.shape
            .iter()
            .zip(&self.strides)
            .map(|(&len, &stride)| (rank / stride) % len)
            .collect()
    }

    /// Index of `coord` along `axis` for the cell at `rank`.
    #[inline]
    pub fn axis_index(&self, rank: usize, axis: usize) -> usize {
        (rank / self.strides[axis]) % self.shape[axis]
    }

    /// Canonical position of a coordinate, or `None` if it lies outside
    /// the grid or has the wrong number of axes.
    pub fn rank_of(&self, coord: &[usize]) -> Option<usize> {
        if coord.len() != self.ndim() {
            return None;
        }
        let mut rank = 0;
        for ((&c, &len), &stride) in coord.iter().zip(&self.shape).zip(&self.strides) {
            if c >= len {
                return None;
            }
            rank += c * stride;
        }
        Some(rank)
    }

    /// Chebyshev (L-inf) distance between two cells, in lattice steps.
    pub fn chebyshev(&self, a: usize, b: usize) -> usize {
        (0..self.ndim())
            .map(|axis| self.axis_index(a, axis).abs_diff(self.axis_index(b, axis)))
            .max()
            .unwrap_or(0)
    }

    /// Check that a flat buffer has one entry per cell.
    pub fn check_len(&self, len: usize) -> Result<(), SpaceError> {
        if len != self.cell_count {
            return Err(SpaceError::ShapeMismatch {
                expected: self.cell_count,
                got: len,
            });
        }
        Ok(())
    }
}
