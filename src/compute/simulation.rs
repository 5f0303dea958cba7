//! Tick loop driving agents over a shared landscape.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;
use rand::prelude::*;
use rayon::prelude::*;

use crate::schema::{
    AgentSnapshot, SimulationConfig, SimulationConfigError, SimulationHistory,
    SimulationProgress, SimulationResult, SimulationStats,
};

use super::drift::Drift;
use super::landscape::Landscape;
use super::search::{
    Agent, BlockLayout, DISABLED_SENTINEL, LayoutError, LocalSearch, MutationOutcome,
    NeighborhoodTest, SearchError,
};

/// Simulation errors.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] SimulationConfigError),
    #[error("Invalid block layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),
}

/// Runs every agent once per tick against one landscape.
///
/// All agents share the landscape's cache, so they are stepped one after
/// another; parallelism is only used across independent engines (see
/// `run_replicates`).
pub struct SimulationEngine {
    config: SimulationConfig,
    rng: StdRng,
    landscape: Landscape,
    layout: BlockLayout,
    search: LocalSearch,
    drift: Drift,
    diagnostics: NeighborhoodTest,
    agents: Vec<Agent>,
    history: SimulationHistory,
    tick: u64,
    accepted: u64,
    proposals: u64,
    cancelled: Arc<AtomicBool>,
}

impl SimulationEngine {
    /// Create a new engine with randomly initialized agents.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let (mut rng, landscape) = seeded_landscape(&config)?;
        let layout = BlockLayout::uniform(landscape.n(), config.search.block_size)?;
        let agents = (0..config.agents)
            .map(|_| Agent::random(&landscape, &mut rng))
            .collect();

        Ok(Self {
            search: LocalSearch::from_config(&config.search),
            drift: Drift::new(&config.drift),
            diagnostics: NeighborhoodTest::from_config(&config.diagnostics),
            config,
            rng,
            landscape,
            layout,
            agents,
            history: SimulationHistory::default(),
            tick: 0,
            accepted: 0,
            proposals: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// Ticks completed.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance one tick: drift, one search step per agent, statistics.
    ///
    /// Agent `i` searches block `(i + tick) % blocks`, so every agent cycles
    /// through the whole point.
    pub fn step(&mut self) -> Result<SimulationProgress, SearchError> {
        let tick = self.tick;
        let shifted_locus = self.drift.apply(tick, &mut self.landscape, &mut self.rng);

        let blocks = self.layout.len();
        let mut accepted = 0;
        let mut flipped_bits = 0;
        for (i, agent) in self.agents.iter_mut().enumerate() {
            let outcome = self.search.step(
                &mut self.landscape,
                Some(agent),
                &self.layout,
                (i + tick as usize) % blocks,
                tick,
                &mut self.rng,
            )?;
            if let MutationOutcome::Accepted { flipped } = outcome {
                accepted += 1;
                flipped_bits += flipped;
            }
        }
        self.accepted += accepted;
        self.proposals += self.agents.len() as u64;

        let fitness: Vec<f64> = self
            .agents
            .iter_mut()
            .map(|agent| agent.refresh(&mut self.landscape, tick).fitness)
            .collect();
        let mean_fitness = fitness.iter().sum::<f64>() / fitness.len() as f64;
        let best_fitness = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let acceptance_rate = accepted as f64 / self.agents.len() as f64;

        let neighborhood = self
            .diagnostics
            .success_ratio(
                &mut self.landscape,
                self.agents[0].point_mut(),
                &self.layout,
                0,
            )?
            .unwrap_or(DISABLED_SENTINEL);

        let cache_leaves = self.landscape.cache().total_leaves();
        self.history.mean_fitness.push(mean_fitness);
        self.history.best_fitness.push(best_fitness);
        self.history.acceptance_rate.push(acceptance_rate);
        self.history.flipped_bits.push(flipped_bits);
        self.history.cache_leaves.push(cache_leaves);
        self.history.neighborhood_success.push(neighborhood);

        self.tick += 1;

        Ok(SimulationProgress {
            tick: self.tick,
            total_ticks: self.config.ticks,
            mean_fitness,
            best_fitness,
            acceptance_rate,
            cache_leaves,
            shifted_locus,
        })
    }

    fn should_stop(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || self.tick >= self.config.ticks
    }

    /// Run to completion with a progress callback.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<SimulationResult, SearchError>
    where
        F: FnMut(&SimulationProgress),
    {
        let start_time = std::time::Instant::now();
        info!(
            "Starting simulation: N={}, K={}, {} agents, {:?}",
            self.landscape.n(),
            self.landscape.config().even_k,
            self.agents.len(),
            self.search.strategy()
        );

        while !self.should_stop() {
            let progress = self.step()?;
            callback(&progress);
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        let tick = self.tick;

        let agents: Vec<AgentSnapshot> = self
            .agents
            .iter_mut()
            .enumerate()
            .map(|(id, agent)| AgentSnapshot {
                id,
                fitness: agent.refresh(&mut self.landscape, tick).fitness,
                bits: agent.bitstring(),
            })
            .collect();

        let best_fitness = agents
            .iter()
            .map(|a| a.fitness)
            .fold(f64::NEG_INFINITY, f64::max);
        let final_mean_fitness =
            agents.iter().map(|a| a.fitness).sum::<f64>() / agents.len() as f64;

        let stats = SimulationStats {
            ticks: self.tick,
            evaluations: self.landscape.evaluations(),
            accepted: self.accepted,
            proposals: self.proposals,
            shifts: self.drift.shifts(),
            best_fitness,
            final_mean_fitness,
            cache_leaves: self.landscape.cache().total_leaves(),
            elapsed_seconds: elapsed,
        };
        info!(
            "Simulation finished after {} ticks: mean fitness {:.4}, {} cached leaves",
            stats.ticks, stats.final_mean_fitness, stats.cache_leaves
        );

        Ok(SimulationResult {
            agents,
            stats,
            history: self.history.clone(),
        })
    }

    /// Run to completion.
    pub fn run(&mut self) -> Result<SimulationResult, SearchError> {
        self.run_with_callback(|_| {})
    }
}

/// Engine RNG and landscape for `config`.
///
/// An unset `landscape.seed` is the first draw of the engine RNG, so a fixed
/// `random_seed` fixes the landscape too.
fn seeded_landscape(config: &SimulationConfig) -> Result<(StdRng, Landscape), SimulationError> {
    let seed = config.random_seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut landscape_config = config.landscape.clone();
    landscape_config
        .seed
        .get_or_insert_with(|| rng.r#gen::<u64>());
    let landscape = Landscape::new(&landscape_config).map_err(SimulationConfigError::from)?;

    Ok((rng, landscape))
}

/// The landscape a `SimulationEngine` built from `config` searches.
pub fn simulation_landscape(config: &SimulationConfig) -> Result<Landscape, SimulationError> {
    seeded_landscape(config).map(|(_, landscape)| landscape)
}

/// Run `count` independent engines in parallel.
///
/// Replicate `i` uses `random_seed + i` when a seed is configured. Each
/// replicate owns its landscape, so no cache is shared across threads.
pub fn run_replicates(
    config: &SimulationConfig,
    count: usize,
) -> Result<Vec<SimulationResult>, SimulationError> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let mut replicate = config.clone();
            replicate.random_seed = config.random_seed.map(|s| s.wrapping_add(i as u64));
            let mut engine = SimulationEngine::new(replicate)?;
            Ok(engine.run()?)
        })
        .collect()
}
