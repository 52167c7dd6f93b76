//! Reusable lnPi landscapes.
//!
//! - [`two_wells_line`]: two equal maxima split by a shallow dip.
//! - [`three_wells_line`]: a deep barrier on the left, a weak one on the right.
//! - [`alternating_line`]: many equal maxima one cell apart.
//! - [`gaussian_wells`]: a 2D surface of Gaussian bumps.
//! - [`noisy_wells`]: [`gaussian_wells`] plus seeded noise.

use lnpi_core::{Field, Mask};
use ndarray::{Array1, ArrayD, Dimension, IxDyn};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::MockLnPi;

/// `[0, 1, 2, 1, 0, 1, 2, 1, 0]`: maxima at 2 and 6, barrier 1 deep.
pub const TWO_WELLS: [f64; 9] = [0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0];

/// Maxima 2.0, 2.01 and 1.0 at cells 1, 7 and 11. The left pair is split
/// by a barrier about 5 deep; the right pair by one about 0.1 deep, seen
/// from the shallow well.
pub const THREE_WELLS: [f64; 13] = [
    1.0, 2.0, 1.0, -3.0, -4.0, -3.0, 1.0, 2.01, 1.5, 0.9, 0.85, 1.0, 0.5,
];

/// Five unit maxima at the odd cells.
pub const ALTERNATING: [f64; 11] = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];

/// [`TWO_WELLS`] as a field.
pub fn two_wells_line() -> Field {
    line(&TWO_WELLS)
}

/// [`THREE_WELLS`] as a field.
pub fn three_wells_line() -> Field {
    line(&THREE_WELLS)
}

/// [`ALTERNATING`] as a field.
pub fn alternating_line() -> Field {
    line(&ALTERNATING)
}

/// Two wells where the higher one (cells 5..9) lies outside the domain.
pub fn excluded_well_line() -> Field {
    let data = Array1::from(vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0]).into_dyn();
    let domain = ArrayD::from_shape_fn(IxDyn(&[9]), |ix| ix[0] < 5);
    Field::with_domain(data, domain).expect("fixture shapes match")
}

/// A one-dimensional field over `values`.
pub fn line(values: &[f64]) -> Field {
    Field::from_vec(values.to_vec()).expect("fixture is non-empty")
}

/// A Gaussian bump on a 2D surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Well {
    pub row: f64,
    pub col: f64,
    pub height: f64,
    pub width: f64,
}

impl Well {
    pub fn new(row: f64, col: f64, height: f64, width: f64) -> Self {
        Self {
            row,
            col,
            height,
            width,
        }
    }
}

/// Sum of Gaussian `wells` on a `rows x cols` surface.
pub fn gaussian_wells(rows: usize, cols: usize, wells: &[Well]) -> ArrayD<f64> {
    ArrayD::from_shape_fn(IxDyn(&[rows, cols]), |ix| {
        let (r, c) = (ix[0] as f64, ix[1] as f64);
        wells
            .iter()
            .map(|w| {
                let d2 = (r - w.row).powi(2) + (c - w.col).powi(2);
                w.height * (-d2 / (2.0 * w.width * w.width)).exp()
            })
            .sum()
    })
}

/// [`gaussian_wells`] plus Gaussian noise of standard deviation `scale`,
/// deterministic in `seed`.
pub fn noisy_wells(rows: usize, cols: usize, wells: &[Well], scale: f64, seed: u64) -> ArrayD<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = gaussian_wells(rows, cols, wells);
    data.mapv_inplace(|v| v + scale * box_muller(&mut rng));
    data
}

/// Standard normal sample.
fn box_muller(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Three wells in a row on a 24x24 surface, the middle one shallow.
pub fn three_wells_surface() -> Vec<Well> {
    vec![
        Well::new(12.0, 4.0, 10.0, 2.0),
        Well::new(12.0, 12.0, 6.0, 2.0),
        Well::new(12.0, 20.0, 10.0, 2.0),
    ]
}

/// A domain mask that excludes the cells where `exclude` holds.
pub fn domain_excluding<F>(shape: &[usize], exclude: F) -> Mask
where
    F: Fn(&[usize]) -> bool,
{
    ArrayD::from_shape_fn(IxDyn(shape), |ix| !exclude(ix.slice()))
}

/// A [`MockLnPi`] over a 2D surface of wells.
pub fn mock_surface(rows: usize, cols: usize, wells: &[Well]) -> MockLnPi {
    MockLnPi::new(gaussian_wells(rows, cols, wells))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_seeded() {
        let wells = three_wells_surface();
        let a = noisy_wells(8, 8, &wells, 0.1, 7);
        let b = noisy_wells(8, 8, &wells, 0.1, 7);
        let c = noisy_wells(8, 8, &wells, 0.1, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn wells_peak_at_their_centres() {
        let data = gaussian_wells(5, 5, &[Well::new(2.0, 2.0, 3.0, 1.0)]);
        assert_eq!(data[[2, 2]], 3.0);
        assert!(data[[0, 0]] < data[[1, 1]]);
    }

    #[test]
    fn excluded_fixture_domain() {
        let field = excluded_well_line();
        assert_eq!(field.domain_count(), 5);
    }
}
