//! Landscape drift: periodic resampling of one random locus.

use log::debug;
use rand::Rng;

use crate::schema::DriftConfig;

use super::landscape::Landscape;

/// Resample the contributions of one uniformly chosen locus.
///
/// Returns the shifted locus. Every point sharing that locus's state
/// sequences gets a fresh contribution on its next evaluation.
pub fn shift<R: Rng + ?Sized>(landscape: &mut Landscape, rng: &mut R) -> usize {
    let locus = rng.gen_range(0..landscape.n());
    landscape.resample(locus);
    debug!("Shifted landscape at locus {locus}");
    locus
}

/// Applies `shift` at a fixed tick cadence.
#[derive(Debug, Clone, Default)]
pub struct Drift {
    period: Option<u64>,
    shifts: u64,
}

impl Drift {
    pub fn new(config: &DriftConfig) -> Self {
        Self {
            period: config.period.filter(|&p| p > 0),
            shifts: 0,
        }
    }

    /// Whether a shift is scheduled at `tick`. Tick 0 never shifts.
    pub fn is_due(&self, tick: u64) -> bool {
        self.period.is_some_and(|p| tick > 0 && tick % p == 0)
    }

    /// Shift the landscape if one is scheduled at `tick`.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        tick: u64,
        landscape: &mut Landscape,
        rng: &mut R,
    ) -> Option<usize> {
        if !self.is_due(tick) {
            return None;
        }
        self.shifts += 1;
        Some(shift(landscape, rng))
    }

    /// Shifts applied so far.
    pub fn shifts(&self) -> u64 {
        self.shifts
    }
}
