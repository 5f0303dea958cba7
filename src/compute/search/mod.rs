//! Local search over an NK landscape.
//!
//! # Overview
//!
//! - **Blocks** (`block`): contiguous partition of a point and the shared
//!   mutation proposal (one forced flip plus independent flips)
//! - **Agents** (`agent`): a point with a tick-stamped evaluation
//! - **Strategies** (`strategy`): Global, Team, Individual and TeamParallel
//!   acceptance rules behind one `LocalSearch::step` dispatcher
//! - **Neighborhood** (`neighborhood`): exhaustive `2^k` scan of one block
//!
//! # Example
//!
//! ```rust
//! use nk_landscape::compute::Landscape;
//! use nk_landscape::compute::search::{Agent, BlockLayout, LocalSearch};
//! use nk_landscape::schema::{LandscapeConfig, StrategyKind};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let mut landscape = Landscape::new(&LandscapeConfig::new(8, 1, 0, 0).with_seed(1)).unwrap();
//! let layout = BlockLayout::uniform(8, 4).unwrap();
//! let mut agent = Agent::random(&landscape, &mut rng);
//!
//! let search = LocalSearch::new(StrategyKind::Team, 0.2);
//! let outcome = search
//!     .step(&mut landscape, Some(&mut agent), &layout, 0, 0, &mut rng)
//!     .unwrap();
//! assert!(outcome.count() >= 0);
//! ```

mod agent;
mod block;
mod neighborhood;
mod strategy;

pub use agent::{Agent, bitstring};
pub use block::{BlockLayout, LayoutError, flip_all, hamming, propose_mutation};
pub use neighborhood::{
    DISABLED_SENTINEL, MAX_SCAN_BITS, NeighborhoodScan, NeighborhoodTest, scan,
};
pub use strategy::{LocalSearch, MutationOutcome, SKIPPED_SENTINEL, SearchError};
