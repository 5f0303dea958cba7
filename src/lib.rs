//! NK landscape - Rugged fitness landscapes with lazily memoized
//! contributions, and the local-search agents that climb them.
//!
//! Each locus's fitness contribution depends on its own bit and on the bits
//! of a fixed set of linked loci. The number of joint configurations grows
//! exponentially with the number of links, so contributions are drawn on
//! first visit and cached in a per-locus trie instead of being tabulated.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration and result types
//! - `compute`: Epistasis graph, fitness cache, oracle, drift, search
//!   strategies and the simulation engine
//!
//! # Example
//!
//! ```rust,no_run
//! use nk_landscape::{
//!     compute::SimulationEngine,
//!     schema::{LandscapeConfig, SearchConfig, SimulationConfig, StrategyKind},
//! };
//!
//! let config = SimulationConfig {
//!     landscape: LandscapeConfig::new(20, 4, 1, 1),
//!     search: SearchConfig {
//!         strategy: StrategyKind::Team,
//!         ..Default::default()
//!     },
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let mut engine = SimulationEngine::new(config).unwrap();
//! let result = engine.run().unwrap();
//!
//! println!("Mean fitness after {} ticks: {:.4}",
//!     result.stats.ticks, result.stats.final_mean_fitness);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{Evaluation, FitnessCache, Landscape, SimulationEngine};
pub use schema::{LandscapeConfig, SimulationConfig, StrategyKind};
