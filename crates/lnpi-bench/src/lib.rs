//! Benchmark profiles and utilities for lnPi phase segmentation.
//!
//! Provides pre-built landscapes for benchmarking:
//!
//! - [`reference_profile`]: 100x100 surface (10K cells) with four noisy wells
//! - [`stress_profile`]: 316x316 surface (~100K cells) with eight noisy wells
//! - [`init_well_centres`]: deterministic well placement via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use lnpi_core::Field;
use lnpi_test_utils::fixtures::{noisy_wells, Well};
use lnpi_test_utils::MockLnPi;

/// Noise standard deviation added to every profile.
pub const NOISE_SCALE: f64 = 0.02;

/// Build the reference benchmark landscape: 100x100 surface (10K cells).
///
/// Four wells of alternating height 10 and 6, width 5.
pub fn reference_profile(seed: u64) -> Field {
    let wells = init_well_centres(100, 100, 4, seed);
    Field::new(noisy_wells(100, 100, &wells, NOISE_SCALE, seed)).unwrap()
}

/// Build the stress benchmark landscape: 316x316 surface (~100K cells).
///
/// Same construction as [`reference_profile`] with eight wells.
pub fn stress_profile(seed: u64) -> Field {
    let wells = init_well_centres(316, 316, 8, seed);
    Field::new(noisy_wells(316, 316, &wells, NOISE_SCALE, seed)).unwrap()
}

/// [`reference_profile`] wrapped as an lnPi container.
pub fn reference_lnpi(seed: u64) -> MockLnPi {
    MockLnPi::new(reference_profile(seed).data().clone())
}

/// Generate deterministic well centres.
///
/// Places `n` wells on distinct cells of a `rows x cols` surface using a
/// simple hash of the seed. Heights alternate between 10 and 6; the width
/// is a twentieth of the shorter side.
pub fn init_well_centres(rows: usize, cols: usize, n: u16, seed: u64) -> Vec<Well> {
    let cell_count = rows * cols;
    let width = (rows.min(cols) as f64 / 20.0).max(1.0);
    let mut wells = Vec::with_capacity(n as usize);
    let mut occupied = std::collections::HashSet::new();

    for i in 0..n {
        let mut pos = (seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(i as u64 * 1442695040888963407)
            % cell_count as u64) as usize;

        // Step forward past occupied cells
        while occupied.contains(&pos) {
            pos = (pos + 1) % cell_count;
        }
        occupied.insert(pos);
        let height = if i % 2 == 0 { 10.0 } else { 6.0 };
        wells.push(Well::new(
            (pos / cols) as f64,
            (pos % cols) as f64,
            height,
            width,
        ));
    }

    wells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_shape() {
        let field = reference_profile(42);
        assert_eq!(field.shape(), &[100, 100]);
        assert_eq!(field.domain_count(), 10_000);
    }

    #[test]
    fn init_well_centres_no_collisions() {
        let wells = init_well_centres(10, 10, 10, 42);
        assert_eq!(wells.len(), 10);

        let cells: std::collections::HashSet<(u64, u64)> = wells
            .iter()
            .map(|w| (w.row as u64, w.col as u64))
            .collect();
        assert_eq!(cells.len(), 10, "all centres should be unique");

        for w in &wells {
            assert!(w.row < 10.0 && w.col < 10.0, "centre {w:?} out of bounds");
        }
    }

    #[test]
    fn init_well_centres_deterministic() {
        let a = init_well_centres(100, 100, 5, 42);
        let b = init_well_centres(100, 100, 5, 42);
        assert_eq!(a, b);
    }
}
