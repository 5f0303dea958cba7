//! Mutation policies: propose a local change to an agent's point and
//! decide, from the landscape, whether to keep it.

use std::ops::Range;

use log::trace;
use rand::Rng;

use crate::compute::Landscape;
use crate::schema::{SearchConfig, StrategyKind};

use super::agent::Agent;
use super::block::{BlockLayout, flip_all, hamming, propose_mutation};

/// Count reported by a skipped search call.
pub const SKIPPED_SENTINEL: i64 = -1;

/// Result of one search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// No agent was supplied; nothing was evaluated or changed.
    Skipped,
    /// The proposal was dropped and the point is unchanged.
    Rejected,
    /// The point now differs from its previous value in `flipped` bits.
    Accepted { flipped: usize },
}

impl MutationOutcome {
    /// Bits changed: `-1` when skipped, `0` when rejected.
    pub fn count(&self) -> i64 {
        match self {
            MutationOutcome::Skipped => SKIPPED_SENTINEL,
            MutationOutcome::Rejected => 0,
            MutationOutcome::Accepted { flipped } => *flipped as i64,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, MutationOutcome::Accepted { .. })
    }
}

/// Search call errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Block {index} does not exist (layout has {blocks} blocks)")]
    UnknownBlock { index: usize, blocks: usize },
    #[error("Point has {found} loci, landscape has {expected}")]
    PointLength { expected: usize, found: usize },
    #[error("Block layout covers {layout} loci, landscape has {n}")]
    LayoutMismatch { layout: usize, n: usize },
    #[error("Block {start}..{end} lies outside a point of {n} loci")]
    BlockOutOfRange { start: usize, end: usize, n: usize },
    #[error("Block of {bits} bits is too wide to enumerate (limit {limit})")]
    BlockTooLarge { bits: usize, limit: usize },
}

pub(crate) fn block_range(layout: &BlockLayout, index: usize) -> Result<Range<usize>, SearchError> {
    layout.block(index).ok_or(SearchError::UnknownBlock {
        index,
        blocks: layout.len(),
    })
}

pub(crate) fn check_shapes(
    landscape: &Landscape,
    point: &[bool],
    layout: &BlockLayout,
) -> Result<(), SearchError> {
    if point.len() != landscape.n() {
        return Err(SearchError::PointLength {
            expected: landscape.n(),
            found: point.len(),
        });
    }
    if layout.n() != landscape.n() {
        return Err(SearchError::LayoutMismatch {
            layout: layout.n(),
            n: landscape.n(),
        });
    }
    Ok(())
}

/// A configured mutation policy.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSearch {
    strategy: StrategyKind,
    prob_mut: f64,
}

impl LocalSearch {
    pub fn new(strategy: StrategyKind, prob_mut: f64) -> Self {
        Self { strategy, prob_mut }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.strategy, config.prob_mut)
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Run one mutation attempt for `agent` on `block`.
    ///
    /// `None` stands for a caller that is still initializing: the call is
    /// skipped without touching the landscape. TeamParallel mutates every
    /// block of the layout and ignores `block`.
    pub fn step<R: Rng + ?Sized>(
        &self,
        landscape: &mut Landscape,
        agent: Option<&mut Agent>,
        layout: &BlockLayout,
        block: usize,
        tick: u64,
        rng: &mut R,
    ) -> Result<MutationOutcome, SearchError> {
        let Some(agent) = agent else {
            return Ok(MutationOutcome::Skipped);
        };
        check_shapes(landscape, agent.point(), layout)?;

        let outcome = match self.strategy {
            StrategyKind::Global { accept_always } => {
                let range = block_range(layout, block)?;
                self.global(landscape, agent, range, accept_always, tick, rng)
            }
            StrategyKind::Team => {
                let range = block_range(layout, block)?;
                self.team(landscape, agent, range, tick, rng)
            }
            StrategyKind::Individual => {
                let range = block_range(layout, block)?;
                self.individual(landscape, agent, range, tick, rng)
            }
            StrategyKind::TeamParallel => self.team_parallel(landscape, agent, layout, tick, rng),
        };

        trace!("{:?} on block {block}: {outcome:?}", self.strategy);
        Ok(outcome)
    }

    fn global<R: Rng + ?Sized>(
        &self,
        landscape: &mut Landscape,
        agent: &mut Agent,
        range: Range<usize>,
        accept_always: bool,
        tick: u64,
        rng: &mut R,
    ) -> MutationOutcome {
        let before = agent.refresh(landscape, tick).fitness;

        let flipped = propose_mutation(agent.point_mut(), range, self.prob_mut, rng);
        let after = landscape.evaluate(agent.point());

        if accept_always || after.fitness > before {
            agent.commit(after, landscape, tick);
            MutationOutcome::Accepted {
                flipped: flipped.len(),
            }
        } else {
            flip_all(agent.point_mut(), &flipped);
            MutationOutcome::Rejected
        }
    }

    fn team<R: Rng + ?Sized>(
        &self,
        landscape: &mut Landscape,
        agent: &mut Agent,
        range: Range<usize>,
        tick: u64,
        rng: &mut R,
    ) -> MutationOutcome {
        let before = agent.refresh(landscape, tick).team_sum(range.clone());

        let flipped = propose_mutation(agent.point_mut(), range.clone(), self.prob_mut, rng);
        let after = landscape.evaluate(agent.point());

        if after.team_sum(range) > before {
            agent.commit(after, landscape, tick);
            MutationOutcome::Accepted {
                flipped: flipped.len(),
            }
        } else {
            flip_all(agent.point_mut(), &flipped);
            MutationOutcome::Rejected
        }
    }

    // Each flipped bit is judged by its own contribution under the fully
    // mutated point, not under the point that is finally kept.
    fn individual<R: Rng + ?Sized>(
        &self,
        landscape: &mut Landscape,
        agent: &mut Agent,
        range: Range<usize>,
        tick: u64,
        rng: &mut R,
    ) -> MutationOutcome {
        let before = agent.refresh(landscape, tick).contributions.clone();

        let flipped = propose_mutation(agent.point_mut(), range, self.prob_mut, rng);
        let after = landscape.evaluate(agent.point());

        let (kept, reverted): (Vec<usize>, Vec<usize>) = flipped
            .into_iter()
            .partition(|&locus| after.contributions[locus] > before[locus]);
        flip_all(agent.point_mut(), &reverted);

        if kept.is_empty() {
            return MutationOutcome::Rejected;
        }

        let evaluation = if reverted.is_empty() {
            after
        } else {
            landscape.evaluate(agent.point())
        };
        agent.commit(evaluation, landscape, tick);

        MutationOutcome::Accepted {
            flipped: kept.len(),
        }
    }

    fn team_parallel<R: Rng + ?Sized>(
        &self,
        landscape: &mut Landscape,
        agent: &mut Agent,
        layout: &BlockLayout,
        tick: u64,
        rng: &mut R,
    ) -> MutationOutcome {
        let baseline = agent.refresh(landscape, tick).clone();
        let mut candidate = agent.point().to_vec();
        let mut kept = Vec::new();

        for range in layout.iter() {
            let flipped = propose_mutation(&mut candidate, range.clone(), self.prob_mut, rng);
            let after = landscape.evaluate(&candidate);
            let improved = after.team_sum(range.clone()) > baseline.team_sum(range);

            // Back to the baseline before the next block is tried
            flip_all(&mut candidate, &flipped);
            if improved {
                kept.extend(flipped);
            }
        }

        flip_all(agent.point_mut(), &kept);
        let mutated = hamming(agent.point(), &candidate);
        if mutated == 0 {
            return MutationOutcome::Rejected;
        }

        let evaluation = landscape.evaluate(agent.point());
        agent.commit(evaluation, landscape, tick);
        MutationOutcome::Accepted { flipped: mutated }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LandscapeConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const ALL: [StrategyKind; 5] = [
        StrategyKind::Global {
            accept_always: false,
        },
        StrategyKind::Global {
            accept_always: true,
        },
        StrategyKind::Team,
        StrategyKind::Individual,
        StrategyKind::TeamParallel,
    ];

    fn setup(seed: u64) -> (Landscape, BlockLayout, Agent, StdRng) {
        let landscape =
            Landscape::new(&LandscapeConfig::new(12, 2, 1, 1).with_seed(seed)).unwrap();
        let layout = BlockLayout::uniform(12, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(seed ^ 0xABCD);
        let agent = Agent::random(&landscape, &mut rng);
        (landscape, layout, agent, rng)
    }

    #[test]
    fn test_null_caller_is_skipped() {
        let (mut landscape, layout, _, mut rng) = setup(1);
        for strategy in ALL {
            let search = LocalSearch::new(strategy, 0.5);
            let outcome = search
                .step(&mut landscape, None, &layout, 0, 0, &mut rng)
                .unwrap();
            assert_eq!(outcome, MutationOutcome::Skipped);
            assert_eq!(outcome.count(), SKIPPED_SENTINEL);
        }
        assert_eq!(landscape.evaluations(), 0);
        assert_eq!(landscape.cache().total_leaves(), 0);
    }

    #[test]
    fn test_unknown_block() {
        let (mut landscape, layout, mut agent, mut rng) = setup(2);
        let search = LocalSearch::new(StrategyKind::Team, 0.1);
        assert_eq!(
            search.step(&mut landscape, Some(&mut agent), &layout, 3, 0, &mut rng),
            Err(SearchError::UnknownBlock {
                index: 3,
                blocks: 3
            })
        );
    }

    #[test]
    fn test_point_length_mismatch() {
        let (mut landscape, layout, _, mut rng) = setup(3);
        let mut agent = Agent::new(vec![false; 5]);
        let search = LocalSearch::new(StrategyKind::Individual, 0.1);
        assert_eq!(
            search.step(&mut landscape, Some(&mut agent), &layout, 0, 0, &mut rng),
            Err(SearchError::PointLength {
                expected: 12,
                found: 5
            })
        );
    }

    #[test]
    fn test_global_accepts_only_improvements() {
        let (mut landscape, layout, mut agent, mut rng) = setup(4);
        let search = LocalSearch::from_config(&SearchConfig {
            prob_mut: 0.3,
            ..Default::default()
        });

        for tick in 0..60 {
            let before_point = agent.point().to_vec();
            let before = agent.refresh(&mut landscape, tick).fitness;
            let block = (tick as usize) % layout.len();
            let outcome = search
                .step(&mut landscape, Some(&mut agent), &layout, block, tick, &mut rng)
                .unwrap();

            match outcome {
                MutationOutcome::Accepted { flipped } => {
                    assert!(agent.fitness() > before);
                    assert_eq!(hamming(agent.point(), &before_point), flipped);
                }
                MutationOutcome::Rejected => {
                    assert_eq!(agent.point(), before_point.as_slice());
                    assert_eq!(agent.fitness(), before);
                }
                MutationOutcome::Skipped => unreachable!(),
            }
        }
    }

    #[test]
    fn test_accept_always_walks() {
        let (mut landscape, layout, mut agent, mut rng) = setup(5);
        let search = LocalSearch::new(
            StrategyKind::Global {
                accept_always: true,
            },
            0.2,
        );

        for tick in 0..20 {
            let before_point = agent.point().to_vec();
            let outcome = search
                .step(&mut landscape, Some(&mut agent), &layout, 1, tick, &mut rng)
                .unwrap();
            let MutationOutcome::Accepted { flipped } = outcome else {
                panic!("accept_always rejected a proposal");
            };
            assert!(flipped >= 1);
            assert_eq!(hamming(agent.point(), &before_point), flipped);
            // Only block 1 may change
            assert_eq!(agent.point()[..4], before_point[..4]);
            assert_eq!(agent.point()[8..], before_point[8..]);
        }
    }

    #[test]
    fn test_team_compares_block_sum() {
        let (mut landscape, layout, mut agent, mut rng) = setup(6);
        let search = LocalSearch::new(StrategyKind::Team, 0.25);

        for tick in 0..40 {
            let before_point = agent.point().to_vec();
            let before_sum = agent.refresh(&mut landscape, tick).team_sum(4..8);
            let outcome = search
                .step(&mut landscape, Some(&mut agent), &layout, 1, tick, &mut rng)
                .unwrap();

            if outcome.is_accepted() {
                let after_sum: f64 = agent.contributions()[4..8].iter().sum();
                assert!(after_sum > before_sum);
            } else {
                assert_eq!(agent.point(), before_point.as_slice());
            }
        }
    }

    #[test]
    fn test_individual_judges_bits_under_full_mutation() {
        for seed in 0..20 {
            let (mut landscape, layout, mut agent, mut rng) = setup(100 + seed);
            let search = LocalSearch::new(StrategyKind::Individual, 0.6);

            // Replay the same proposal on clones to derive the expected
            // per-bit decisions.
            let mut shadow_landscape = landscape.clone();
            let mut shadow_agent = agent.clone();
            let mut shadow_rng = rng.clone();
            let before = shadow_agent
                .refresh(&mut shadow_landscape, 0)
                .contributions
                .clone();
            let mut mutated = shadow_agent.point().to_vec();
            let flipped = propose_mutation(&mut mutated, 0..4, 0.6, &mut shadow_rng);
            let after = shadow_landscape.evaluate(&mutated);
            let expected_kept: Vec<usize> = flipped
                .iter()
                .copied()
                .filter(|&locus| after.contributions[locus] > before[locus])
                .collect();

            let original = agent.point().to_vec();
            let outcome = search
                .step(&mut landscape, Some(&mut agent), &layout, 0, 0, &mut rng)
                .unwrap();

            let mut expected_point = original.clone();
            flip_all(&mut expected_point, &expected_kept);
            assert_eq!(agent.point(), expected_point.as_slice());
            assert_eq!(outcome.count(), expected_kept.len() as i64);
        }
    }

    #[test]
    fn test_team_parallel_counts_against_baseline() {
        for seed in 0..10 {
            let (mut landscape, layout, mut agent, mut rng) = setup(200 + seed);
            let search = LocalSearch::new(StrategyKind::TeamParallel, 0.4);
            let baseline = agent.point().to_vec();

            let outcome = search
                .step(&mut landscape, Some(&mut agent), &layout, 0, 0, &mut rng)
                .unwrap();

            assert_eq!(
                outcome.count(),
                hamming(agent.point(), &baseline) as i64
            );
            if outcome.is_accepted() {
                // The final point is evaluated once the blocks are assembled
                let fresh = landscape.evaluate(agent.point());
                assert_eq!(fresh.fitness, agent.fitness());
            }
        }
    }

    #[test]
    fn test_team_parallel_ignores_block_index() {
        let (mut landscape, layout, mut agent, mut rng) = setup(7);
        let search = LocalSearch::new(StrategyKind::TeamParallel, 0.1);
        assert!(
            search
                .step(&mut landscape, Some(&mut agent), &layout, 99, 0, &mut rng)
                .is_ok()
        );
    }

    proptest! {
        #[test]
        fn prop_reject_restores_and_accept_counts(seed in any::<u64>(), which in 0usize..5, block in 0usize..3) {
            let (mut landscape, layout, mut agent, mut rng) = setup(seed);
            let search = LocalSearch::new(ALL[which], 0.3);
            let before = agent.point().to_vec();

            let outcome = search
                .step(&mut landscape, Some(&mut agent), &layout, block, 0, &mut rng)
                .unwrap();

            match outcome {
                MutationOutcome::Rejected => prop_assert_eq!(agent.point(), before.as_slice()),
                MutationOutcome::Accepted { flipped } => {
                    prop_assert!(flipped > 0);
                    prop_assert_eq!(hamming(agent.point(), &before), flipped);
                }
                MutationOutcome::Skipped => prop_assert!(false, "agent was supplied"),
            }
        }
    }
}
