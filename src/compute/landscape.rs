//! Fitness oracle: the epistasis graph and the contribution cache combined.

use std::ops::Range;

use rand::Rng;

use crate::schema::{ConfigError, LandscapeConfig};

use super::cache::FitnessCache;
use super::epistasis::EpistasisGraph;

/// Fitness of a point and the contribution of each locus.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Mean of `contributions`.
    pub fitness: f64,
    /// Contribution of each locus under the evaluated point.
    pub contributions: Vec<f64>,
}

impl Evaluation {
    /// Summed contribution of the loci in `block`.
    #[inline]
    pub fn team_sum(&self, block: Range<usize>) -> f64 {
        self.contributions[block].iter().sum()
    }
}

/// An NK landscape evaluated lazily on first visit.
///
/// All cache growth goes through `&mut self`, so any host that shares one
/// landscape between threads has to serialize access (for instance behind a
/// `Mutex`); first-touch node creation is not safe to race.
#[derive(Debug, Clone)]
pub struct Landscape {
    graph: EpistasisGraph,
    cache: FitnessCache,
    last_contributions: Vec<f64>,
    states: Vec<bool>,
    evaluations: u64,
}

impl Landscape {
    /// Build a landscape. Link-count violations are clamped with a warning.
    pub fn new(config: &LandscapeConfig) -> Result<Self, ConfigError> {
        let graph = EpistasisGraph::build(config)?;
        let n = graph.len();
        let depth = graph.nlink() + 1;
        let cache = FitnessCache::new(n, depth, config.seed);

        Ok(Self {
            graph,
            cache,
            last_contributions: vec![0.0; n],
            states: Vec::with_capacity(depth),
            evaluations: 0,
        })
    }

    /// Number of loci.
    #[inline]
    pub fn n(&self) -> usize {
        self.graph.len()
    }

    /// Effective configuration (after any clamping).
    pub fn config(&self) -> &LandscapeConfig {
        self.graph.config()
    }

    pub fn graph(&self) -> &EpistasisGraph {
        &self.graph
    }

    pub fn cache(&self) -> &FitnessCache {
        &self.cache
    }

    /// Evaluate a point.
    ///
    /// Fills the cache for any state sequence seen for the first time and
    /// records each locus's contribution as its last contribution.
    ///
    /// # Panics
    ///
    /// Panics if `point` does not have one bit per locus.
    pub fn evaluate(&mut self, point: &[bool]) -> Evaluation {
        assert_eq!(point.len(), self.n(), "point length does not match N");

        for locus in 0..self.n() {
            self.graph.gather_states(locus, point, &mut self.states);
            self.last_contributions[locus] = self.cache.contribution(locus, &self.states);
        }
        self.evaluations += 1;

        let contributions = self.last_contributions.clone();
        let fitness = contributions.iter().sum::<f64>() / contributions.len() as f64;

        Evaluation {
            fitness,
            contributions,
        }
    }

    /// Contribution of one locus under `point`.
    pub fn contribution(&mut self, locus: usize, point: &[bool]) -> f64 {
        self.graph.gather_states(locus, point, &mut self.states);
        self.cache.contribution(locus, &self.states)
    }

    /// Contributions recorded by the most recent `evaluate` call.
    pub fn last_contributions(&self) -> &[f64] {
        &self.last_contributions
    }

    /// Redraw every contribution of `locus`.
    pub fn resample(&mut self, locus: usize) {
        self.cache.resample(locus);
    }

    /// Cache version; changes whenever previously returned values may
    /// have become stale.
    pub fn version(&self) -> u64 {
        self.cache.version()
    }

    /// Number of `evaluate` calls so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Uniformly random point of the right length.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<bool> {
        (0..self.n()).map(|_| rng.r#gen::<bool>()).collect()
    }
}
