//! A searching agent: one point plus its last known evaluation.

use rand::Rng;

use crate::compute::{Evaluation, Landscape};

/// When an evaluation was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    tick: u64,
    version: u64,
}

/// A point owned by the caller of the search strategies.
///
/// The agent keeps the evaluation of its current point together with the
/// tick and cache version it was computed under, so the fitness is only
/// recomputed when the tick advances or the landscape shifts.
#[derive(Debug, Clone)]
pub struct Agent {
    point: Vec<bool>,
    evaluation: Evaluation,
    stamp: Option<Stamp>,
}

impl Agent {
    /// Agent at `point`; not evaluated yet.
    pub fn new(point: Vec<bool>) -> Self {
        let n = point.len();
        Self {
            point,
            evaluation: Evaluation {
                fitness: 0.0,
                contributions: vec![0.0; n],
            },
            stamp: None,
        }
    }

    /// Agent at a uniformly random point of `landscape`.
    pub fn random<R: Rng + ?Sized>(landscape: &Landscape, rng: &mut R) -> Self {
        Self::new(landscape.random_point(rng))
    }

    pub fn point(&self) -> &[bool] {
        &self.point
    }

    pub(crate) fn point_mut(&mut self) -> &mut [bool] {
        &mut self.point
    }

    /// Fitness of the last evaluation.
    pub fn fitness(&self) -> f64 {
        self.evaluation.fitness
    }

    /// Per-locus contributions of the last evaluation.
    pub fn contributions(&self) -> &[f64] {
        &self.evaluation.contributions
    }

    /// Whether the stored evaluation is current for `tick` and the
    /// landscape's cache version.
    pub fn is_fresh(&self, landscape: &Landscape, tick: u64) -> bool {
        self.stamp
            == Some(Stamp {
                tick,
                version: landscape.version(),
            })
    }

    /// Evaluation of the current point, recomputed only when stale.
    pub fn refresh(&mut self, landscape: &mut Landscape, tick: u64) -> &Evaluation {
        if !self.is_fresh(landscape, tick) {
            let evaluation = landscape.evaluate(&self.point);
            self.commit(evaluation, landscape, tick);
        }
        &self.evaluation
    }

    /// Record `evaluation` as the evaluation of the current point.
    pub(crate) fn commit(&mut self, evaluation: Evaluation, landscape: &Landscape, tick: u64) {
        self.evaluation = evaluation;
        self.stamp = Some(Stamp {
            tick,
            version: landscape.version(),
        });
    }

    /// Point as a bitstring, locus 0 first.
    pub fn bitstring(&self) -> String {
        bitstring(&self.point)
    }
}

/// Render a point as `0`/`1` characters, locus 0 first.
pub fn bitstring(point: &[bool]) -> String {
    point.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LandscapeConfig;

    #[test]
    fn test_refresh_reuses_fresh_evaluation() {
        let mut landscape =
            Landscape::new(&LandscapeConfig::new(6, 1, 0, 0).with_seed(1)).unwrap();
        let mut agent = Agent::new(vec![true, false, true, false, true, false]);

        let fitness = agent.refresh(&mut landscape, 0).fitness;
        assert_eq!(landscape.evaluations(), 1);

        // Same tick, same cache version: no new evaluation
        assert_eq!(agent.refresh(&mut landscape, 0).fitness, fitness);
        assert_eq!(landscape.evaluations(), 1);

        // New tick recomputes
        agent.refresh(&mut landscape, 1);
        assert_eq!(landscape.evaluations(), 2);

        // Shift invalidates within a tick
        landscape.resample(0);
        assert!(!agent.is_fresh(&landscape, 1));
        agent.refresh(&mut landscape, 1);
        assert_eq!(landscape.evaluations(), 3);
    }

    #[test]
    fn test_bitstring() {
        let agent = Agent::new(vec![true, false, false, true]);
        assert_eq!(agent.bitstring(), "1001");
    }
}
