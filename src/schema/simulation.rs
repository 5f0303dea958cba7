//! Simulation configuration types for agents searching an NK landscape.
//!
//! This module provides types for configuring the local-search strategies,
//! landscape drift, neighborhood diagnostics and the tick loop that drives
//! them, plus the progress and result types reported back to callers.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConfigError, LandscapeConfig};

/// Top-level configuration for a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Landscape shape and leaf seed.
    pub landscape: LandscapeConfig,
    /// Mutation policy and its parameters.
    #[serde(default)]
    pub search: SearchConfig,
    /// Landscape drift cadence.
    #[serde(default)]
    pub drift: DriftConfig,
    /// Exhaustive neighborhood diagnostics.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Number of agents searching the shared landscape.
    #[serde(default = "default_agents")]
    pub agents: usize,
    /// Number of ticks to run.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            landscape: LandscapeConfig::default(),
            search: SearchConfig::default(),
            drift: DriftConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            agents: default_agents(),
            ticks: default_ticks(),
            random_seed: None,
        }
    }
}

fn default_agents() -> usize {
    10
}
fn default_ticks() -> u64 {
    100
}

/// Mutation policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StrategyKind {
    /// Accept iff the fitness of the whole point improves.
    Global {
        /// Accept every proposal regardless of fitness (random walk).
        #[serde(default)]
        accept_always: bool,
    },
    /// Accept iff the summed contribution of the mutated block improves.
    Team,
    /// Keep each flipped bit iff its own locus contribution improves.
    Individual,
    /// Mutate every block against a shared baseline and keep the
    /// improving blocks.
    TeamParallel,
}

impl Default for StrategyKind {
    fn default() -> Self {
        Self::Global {
            accept_always: false,
        }
    }
}

/// Local-search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Mutation policy.
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Probability of flipping each non-forced bit of the block (0.0-1.0).
    #[serde(default = "default_prob_mut")]
    pub prob_mut: f64,
    /// Loci per block. The last block may be shorter.
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            prob_mut: default_prob_mut(),
            block_size: default_block_size(),
        }
    }
}

fn default_prob_mut() -> f64 {
    0.1
}
fn default_block_size() -> usize {
    4
}

/// Landscape drift configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Shift one random locus every `period` ticks. `None` keeps the
    /// landscape fixed.
    #[serde(default)]
    pub period: Option<u64>,
}

/// Success criterion for the exhaustive neighborhood test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NeighborhoodCriterion {
    /// Fitness of the whole point improves.
    #[default]
    Global,
    /// Summed contribution of the block improves.
    Team,
    /// Every locus of the block improves its own contribution.
    Individual,
}

/// Exhaustive neighborhood diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Run the diagnostic every tick.
    #[serde(default)]
    pub enabled: bool,
    /// Success criterion.
    #[serde(default)]
    pub criterion: NeighborhoodCriterion,
    /// Blocks wider than this are skipped (reported as disabled).
    #[serde(default = "default_max_block_bits")]
    pub max_block_bits: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            criterion: NeighborhoodCriterion::default(),
            max_block_bits: default_max_block_bits(),
        }
    }
}

fn default_max_block_bits() -> usize {
    12
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// Per-tick progress report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationProgress {
    /// Ticks completed.
    pub tick: u64,
    /// Total ticks planned.
    pub total_ticks: u64,
    /// Mean agent fitness.
    pub mean_fitness: f64,
    /// Best agent fitness this tick.
    pub best_fitness: f64,
    /// Accepted proposals this tick over agents that searched.
    pub acceptance_rate: f64,
    /// Leaves currently held by the fitness cache.
    pub cache_leaves: usize,
    /// Locus shifted this tick, if any.
    pub shifted_locus: Option<usize>,
}

/// Per-tick statistics history.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SimulationHistory {
    /// Mean fitness per tick.
    pub mean_fitness: Vec<f64>,
    /// Best fitness per tick.
    pub best_fitness: Vec<f64>,
    /// Acceptance ratio per tick.
    pub acceptance_rate: Vec<f64>,
    /// Total bits flipped (kept) per tick.
    pub flipped_bits: Vec<usize>,
    /// Cache leaf count per tick.
    pub cache_leaves: Vec<usize>,
    /// Neighborhood success ratio per tick (`-1.0` when disabled).
    pub neighborhood_success: Vec<f64>,
}

/// Snapshot of one agent at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Agent index.
    pub id: usize,
    /// Fitness of the final point.
    pub fitness: f64,
    /// Final point, locus 0 first.
    pub bits: String,
}

/// Final result of a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Final agent states.
    pub agents: Vec<AgentSnapshot>,
    /// Statistics from the run.
    pub stats: SimulationStats,
    /// Full history for analysis.
    pub history: SimulationHistory,
}

/// Statistics from a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Ticks run.
    pub ticks: u64,
    /// Landscape evaluations performed.
    pub evaluations: u64,
    /// Proposals accepted (fully or partly).
    pub accepted: u64,
    /// Proposals made.
    pub proposals: u64,
    /// Landscape shifts applied.
    pub shifts: u64,
    /// Best final agent fitness.
    pub best_fitness: f64,
    /// Mean final agent fitness.
    pub final_mean_fitness: f64,
    /// Leaves held by the cache at the end.
    pub cache_leaves: usize,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
}

// ============================================================================
// Validation
// ============================================================================

/// Simulation configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum SimulationConfigError {
    #[error("At least one agent is required")]
    NoAgents,
    #[error("Mutation probability {0} must lie in [0, 1]")]
    InvalidProbability(f64),
    #[error("Block size must be positive")]
    InvalidBlockSize,
    #[error("Drift period must be positive")]
    InvalidDriftPeriod,
    #[error("Landscape config validation failed: {0}")]
    LandscapeError(#[from] ConfigError),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SimulationConfig {
    /// Validate simulation configuration.
    ///
    /// A link count that violates `EvenK + AftOverlap + ForeOverlap < N` is
    /// not an error here: landscape construction clamps it instead.
    pub fn validate(&self) -> Result<(), SimulationConfigError> {
        if let Err(err @ ConfigError::EmptyLandscape) = self.landscape.validate() {
            return Err(err.into());
        }

        if self.agents == 0 {
            return Err(SimulationConfigError::NoAgents);
        }

        if !(0.0..=1.0).contains(&self.search.prob_mut) {
            return Err(SimulationConfigError::InvalidProbability(
                self.search.prob_mut,
            ));
        }

        if self.search.block_size == 0 {
            return Err(SimulationConfigError::InvalidBlockSize);
        }

        if self.drift.period == Some(0) {
            return Err(SimulationConfigError::InvalidDriftPeriod);
        }

        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SimulationConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_probability() {
        let config = SimulationConfig {
            search: SearchConfig {
                prob_mut: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationConfigError::InvalidProbability(_))
        ));
    }

    #[test]
    fn test_link_violation_is_not_fatal() {
        let config = SimulationConfig {
            landscape: LandscapeConfig::new(6, 0, 6, 0),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strategy_tagged_serialization() {
        let json = r#"{"type": "Global", "accept_always": true}"#;
        let parsed: StrategyKind = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed,
            StrategyKind::Global {
                accept_always: true
            }
        );

        let parsed: StrategyKind = serde_json::from_str(r#"{"type": "TeamParallel"}"#).unwrap();
        assert_eq!(parsed, StrategyKind::TeamParallel);
    }

    #[test]
    fn test_serialization() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.agents, config.agents);
        assert_eq!(parsed.landscape, config.landscape);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"landscape": {{"n": 8, "even_k": 1}}, "agents": 3, "drift": {{"period": 5}}}}"#
        )
        .unwrap();

        let config = SimulationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.landscape.n, 8);
        assert_eq!(config.agents, 3);
        assert_eq!(config.drift.period, Some(5));
        assert_eq!(config.ticks, 100);
    }

    #[test]
    fn test_from_json_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"landscape": {{"n": 8}}, "agents": 0}}"#).unwrap();
        assert!(matches!(
            SimulationConfig::from_json_file(file.path()),
            Err(SimulationConfigError::NoAgents)
        ));
    }
}
