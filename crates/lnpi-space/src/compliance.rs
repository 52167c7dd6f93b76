//! Neighbourhood compliance test helpers.
//!
//! These functions verify that a [`Neighbourhood`] satisfies the invariants
//! the segmentation stages rely on. Reused across the connectivity,
//! morphology and labeling test modules.

use crate::connectivity::Neighbourhood;
use indexmap::IndexSet;

/// Assert that no cell lists itself as a neighbour.
pub fn assert_no_self_loops(nbhd: &Neighbourhood) {
    for rank in 0..nbhd.grid().cell_count() {
        assert!(
            !nbhd.neighbours(rank).contains(&rank),
            "cell {rank} is its own neighbour"
        );
    }
}

/// Assert that `b in neighbours(a)` implies `a in neighbours(b)`.
pub fn assert_neighbours_symmetric(nbhd: &Neighbourhood) {
    for rank in 0..nbhd.grid().cell_count() {
        for nb in nbhd.neighbours(rank) {
            assert!(
                nbhd.neighbours(nb).contains(&rank),
                "neighbour symmetry violated: {nb} in N({rank}) but {rank} not in N({nb})"
            );
        }
    }
}

/// Assert that neighbour lists are duplicate-free, in bounds, and no
/// larger than the interior degree.
pub fn assert_neighbours_unique_and_bounded(nbhd: &Neighbourhood) {
    let cells = nbhd.grid().cell_count();
    for rank in 0..cells {
        let nbs = nbhd.neighbours(rank);
        let unique: IndexSet<_> = nbs.iter().collect();
        assert_eq!(unique.len(), nbs.len(), "duplicate neighbours of {rank}");
        assert!(
            nbs.len() <= nbhd.max_neighbour_degree(),
            "cell {rank} has {} neighbours, degree is {}",
            nbs.len(),
            nbhd.max_neighbour_degree()
        );
        for &nb in &nbs {
            assert!(nb < cells, "neighbour {nb} of {rank} out of bounds");
        }
    }
}

/// Assert that every neighbour lies within Chebyshev distance 1 and differs
/// along at most `order` axes.
pub fn assert_neighbours_respect_order(nbhd: &Neighbourhood) {
    let grid = nbhd.grid();
    for rank in 0..grid.cell_count() {
        for nb in nbhd.neighbours(rank) {
            assert_eq!(grid.chebyshev(rank, nb), 1, "{nb} not adjacent to {rank}");
            let differing = (0..grid.ndim())
                .filter(|&axis| grid.axis_index(rank, axis) != grid.axis_index(nb, axis))
                .count();
            assert!(
                differing <= nbhd.order(),
                "{nb} differs from {rank} along {differing} axes, order is {}",
                nbhd.order()
            );
        }
    }
}

/// Run all compliance checks on a neighbourhood.
pub fn run_full_compliance(nbhd: &Neighbourhood) {
    assert_no_self_loops(nbhd);
    assert_neighbours_symmetric(nbhd);
    assert_neighbours_unique_and_bounded(nbhd);
    assert_neighbours_respect_order(nbhd);
}
