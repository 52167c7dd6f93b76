//! Scans over one log-activity component.
//!
//! A [`ScanAxis`] fixes every lnz component but one. The free component is
//! supplied per build, either as its absolute value or as an offset that
//! is added to every component.

use lnpi_core::LnPi;

use crate::collection::PhaseSet;
use crate::config::BuildRequest;
use crate::creator::PhaseCreator;
use crate::error::PhaseError;

/// Which lnz component varies, and how the others are derived from it.
#[derive(Clone, Debug, PartialEq)]
pub enum ScanAxis {
    /// Fixed lnz values; the free slot takes the scan value.
    Absolute {
        /// lnz with the free slot set to 0.
        lnz: Vec<f64>,
        /// The free slot.
        slot: usize,
    },
    /// Offsets `lnz_i - lnz_slot`; every component is offset + scan value.
    Relative {
        /// Offsets, 0 at the free slot.
        delta: Vec<f64>,
        /// The free slot.
        slot: usize,
    },
}

impl ScanAxis {
    /// Scan the single `None` slot of `lnz`, keeping the others fixed.
    ///
    /// # Errors
    ///
    /// [`PhaseError::Configuration`] unless exactly one slot is `None`.
    pub fn absolute(lnz: &[Option<f64>]) -> Result<Self, PhaseError> {
        let slot = free_slot(lnz)?;
        Ok(Self::Absolute {
            lnz: lnz.iter().map(|v| v.unwrap_or(0.0)).collect(),
            slot,
        })
    }

    /// Scan with every component offset from the `None` slot by the given
    /// amounts.
    ///
    /// # Errors
    ///
    /// [`PhaseError::Configuration`] unless exactly one slot is `None`.
    pub fn relative(dlnz: &[Option<f64>]) -> Result<Self, PhaseError> {
        let slot = free_slot(dlnz)?;
        Ok(Self::Relative {
            delta: dlnz.iter().map(|v| v.unwrap_or(0.0)).collect(),
            slot,
        })
    }

    /// Index of the varied component.
    pub fn slot(&self) -> usize {
        match self {
            Self::Absolute { slot, .. } | Self::Relative { slot, .. } => *slot,
        }
    }

    /// Number of components.
    pub fn ncomp(&self) -> usize {
        match self {
            Self::Absolute { lnz, .. } => lnz.len(),
            Self::Relative { delta, .. } => delta.len(),
        }
    }

    /// Full lnz vector for scan value `value`.
    pub fn lnz(&self, value: f64) -> Vec<f64> {
        match self {
            Self::Absolute { lnz, slot } => {
                let mut out = lnz.clone();
                out[*slot] = value;
                out
            }
            Self::Relative { delta, .. } => delta.iter().map(|d| d + value).collect(),
        }
    }
}

fn free_slot(values: &[Option<f64>]) -> Result<usize, PhaseError> {
    let free: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_none())
        .map(|(i, _)| i)
        .collect();
    match free.as_slice() {
        [slot] => Ok(*slot),
        _ => Err(PhaseError::Configuration {
            reason: format!(
                "scan axis needs exactly one unset component, got {}",
                free.len()
            ),
        }),
    }
}

/// A [`PhaseCreator`] bound to a [`ScanAxis`].
#[derive(Debug)]
pub struct PhaseScan<'c, T> {
    creator: &'c PhaseCreator<T>,
    axis: ScanAxis,
}

impl<'c, T: LnPi + Clone> PhaseScan<'c, T> {
    /// Bind `creator` to `axis`.
    pub fn new(creator: &'c PhaseCreator<T>, axis: ScanAxis) -> Self {
        Self { creator, axis }
    }

    /// The scanned axis.
    pub fn axis(&self) -> &ScanAxis {
        &self.axis
    }

    /// Build phases at scan value `value`.
    pub fn build(&self, value: f64) -> Result<PhaseSet<T>, PhaseError> {
        self.build_with(value, &BuildRequest::new())
    }

    /// Build phases at `value` with further overrides. The request's own
    /// `lnz` is replaced.
    pub fn build_with(
        &self,
        value: f64,
        request: &BuildRequest<'_, T>,
    ) -> Result<PhaseSet<T>, PhaseError> {
        let lnz = self.axis.lnz(value);
        let request = BuildRequest {
            lnz: Some(&lnz),
            ..*request
        };
        tracing::debug!(slot = self.axis.slot(), value, "scan build");
        self.creator.build_phases(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn absolute_fills_free_slot() {
        let axis = ScanAxis::absolute(&[Some(1.0), None, Some(-2.0)]).unwrap();
        assert_eq!(axis.slot(), 1);
        assert_eq!(axis.ncomp(), 3);
        assert_eq!(axis.lnz(0.5), vec![1.0, 0.5, -2.0]);
    }

    #[test]
    fn relative_offsets_every_component() {
        let axis = ScanAxis::relative(&[Some(1.0), None]).unwrap();
        assert_eq!(axis.slot(), 1);
        assert_eq!(axis.lnz(2.0), vec![3.0, 2.0]);
    }

    #[test]
    fn exactly_one_free_slot() {
        assert!(matches!(
            ScanAxis::absolute(&[Some(1.0), Some(2.0)]),
            Err(PhaseError::Configuration { .. })
        ));
        assert!(ScanAxis::relative(&[None, None]).is_err());
        assert!(ScanAxis::absolute(&[]).is_err());
        assert!(ScanAxis::absolute(&[None]).is_ok());
    }

    proptest! {
        #[test]
        fn relative_axis_keeps_offsets(
            offsets in prop::collection::vec(-5.0f64..5.0, 1..5),
            slot_seed in 0usize..5,
            value in -10.0f64..10.0,
        ) {
            let slot = slot_seed % offsets.len();
            let dlnz: Vec<Option<f64>> = offsets
                .iter()
                .enumerate()
                .map(|(i, &d)| (i != slot).then_some(d))
                .collect();
            let lnz = ScanAxis::relative(&dlnz).unwrap().lnz(value);
            prop_assert_eq!(lnz[slot], value);
            for (i, &d) in offsets.iter().enumerate() {
                if i != slot {
                    prop_assert!((lnz[i] - lnz[slot] - d).abs() < 1e-9);
                }
            }
        }
    }
}
