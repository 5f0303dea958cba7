//! Exhaustive neighborhood diagnostics.
//!
//! For one block, every one of the `2^k` settings of its bits is substituted
//! into the point and evaluated. The share of settings that would count as
//! a successful mutation estimates how easy it is to improve from here.

use std::ops::{Deref, DerefMut, Range};

use crate::compute::{Evaluation, Landscape};
use crate::schema::{DiagnosticsConfig, NeighborhoodCriterion};

use super::block::BlockLayout;
use super::strategy::{SearchError, block_range, check_shapes};

/// Widest block `scan` will enumerate.
pub const MAX_SCAN_BITS: usize = 30;

/// Ratio reported when the diagnostic is disabled.
pub const DISABLED_SENTINEL: f64 = -1.0;

/// Counts from one exhaustive scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborhoodScan {
    /// Settings evaluated (`2^k`).
    pub combinations: u64,
    /// Settings meeting the criterion.
    pub successes: u64,
}

impl NeighborhoodScan {
    /// Successes over combinations, in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        self.successes as f64 / self.combinations as f64
    }
}

/// Restores a block of the point when dropped.
struct BlockGuard<'a> {
    point: &'a mut [bool],
    range: Range<usize>,
    saved: Vec<bool>,
}

impl<'a> BlockGuard<'a> {
    fn new(point: &'a mut [bool], range: Range<usize>) -> Self {
        let saved = point[range.clone()].to_vec();
        Self {
            point,
            range,
            saved,
        }
    }
}

impl Deref for BlockGuard<'_> {
    type Target = [bool];

    fn deref(&self) -> &[bool] {
        self.point
    }
}

impl DerefMut for BlockGuard<'_> {
    fn deref_mut(&mut self) -> &mut [bool] {
        self.point
    }
}

impl Drop for BlockGuard<'_> {
    fn drop(&mut self) {
        self.point[self.range.clone()].copy_from_slice(&self.saved);
    }
}

fn is_success(
    criterion: NeighborhoodCriterion,
    range: &Range<usize>,
    before: &Evaluation,
    after: &Evaluation,
) -> bool {
    match criterion {
        NeighborhoodCriterion::Global => after.fitness > before.fitness,
        NeighborhoodCriterion::Team => {
            after.team_sum(range.clone()) > before.team_sum(range.clone())
        }
        NeighborhoodCriterion::Individual => range
            .clone()
            .all(|locus| after.contributions[locus] > before.contributions[locus]),
    }
}

/// Enumerate every setting of `range` in `point` and count successes.
///
/// Settings follow a binary counter from zero, bit `j` of the counter
/// driving locus `range.start + j`. The block's original bits are restored
/// before returning, on every path.
pub fn scan(
    landscape: &mut Landscape,
    point: &mut [bool],
    range: Range<usize>,
    criterion: NeighborhoodCriterion,
) -> Result<NeighborhoodScan, SearchError> {
    if point.len() != landscape.n() {
        return Err(SearchError::PointLength {
            expected: landscape.n(),
            found: point.len(),
        });
    }
    if range.start > range.end || range.end > point.len() {
        return Err(SearchError::BlockOutOfRange {
            start: range.start,
            end: range.end,
            n: point.len(),
        });
    }

    let bits = range.len();
    if bits > MAX_SCAN_BITS {
        return Err(SearchError::BlockTooLarge {
            bits,
            limit: MAX_SCAN_BITS,
        });
    }

    let before = landscape.evaluate(point);
    let mut guard = BlockGuard::new(point, range.clone());

    let combinations = 1u64 << bits;
    let mut successes = 0;
    for counter in 0..combinations {
        for (j, locus) in range.clone().enumerate() {
            guard[locus] = (counter >> j) & 1 == 1;
        }
        let after = landscape.evaluate(&guard);
        if is_success(criterion, &range, &before, &after) {
            successes += 1;
        }
    }

    Ok(NeighborhoodScan {
        combinations,
        successes,
    })
}

/// The diagnostic as configured for a run.
#[derive(Debug, Clone)]
pub struct NeighborhoodTest {
    enabled: bool,
    criterion: NeighborhoodCriterion,
    max_block_bits: usize,
}

impl NeighborhoodTest {
    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        Self {
            enabled: config.enabled,
            criterion: config.criterion,
            max_block_bits: config.max_block_bits.min(MAX_SCAN_BITS),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Probability that a mutation of `block` improves `point`.
    ///
    /// Returns `None` when the test is disabled or the block is wider than
    /// the configured limit.
    pub fn success_ratio(
        &self,
        landscape: &mut Landscape,
        point: &mut [bool],
        layout: &BlockLayout,
        block: usize,
    ) -> Result<Option<f64>, SearchError> {
        if !self.enabled {
            return Ok(None);
        }
        check_shapes(landscape, point, layout)?;
        let range = block_range(layout, block)?;
        if range.len() > self.max_block_bits {
            return Ok(None);
        }

        scan(landscape, point, range, self.criterion).map(|s| Some(s.ratio()))
    }
}
