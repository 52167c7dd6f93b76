//! Connected-component labeling.

use crate::connectivity::Neighbourhood;
use crate::error::SpaceError;
use lnpi_core::Label;
use std::collections::VecDeque;

/// Label the connected components of a binary mask.
///
/// Returns the flat label buffer (0 = background) and the number of
/// components. Labels are assigned `1, 2, ...` in canonical order of each
/// component's first cell, so the result is deterministic.
///
/// # Examples
///
/// ```
/// use lnpi_space::{label, Connectivity, Grid, Neighbourhood};
///
/// let grid = Grid::new(&[7]).unwrap();
/// let nbhd = Neighbourhood::new(&grid, Connectivity::FACE);
/// let mask = [true, true, false, true, false, false, true];
/// let (labels, count) = label(&mask, &nbhd).unwrap();
/// assert_eq!(count, 3);
/// assert_eq!(labels, vec![1, 1, 0, 2, 0, 0, 3]);
/// ```
pub fn label(mask: &[bool], nbhd: &Neighbourhood) -> Result<(Vec<Label>, Label), SpaceError> {
    nbhd.grid().check_len(mask.len())?;

    let mut labels: Vec<Label> = vec![0; mask.len()];
    let mut count: Label = 0;
    let mut queue = VecDeque::new();

    for seed in 0..mask.len() {
        if !mask[seed] || labels[seed] != 0 {
            continue;
        }
        count += 1;
        labels[seed] = count;
        queue.push_back(seed);
        while let Some(rank) = queue.pop_front() {
            for nb in nbhd.neighbours(rank) {
                if mask[nb] && labels[nb] == 0 {
                    labels[nb] = count;
                    queue.push_back(nb);
                }
            }
        }
    }

    Ok((labels, count))
}
