//! Compute module - Landscape construction, evaluation and search.

mod cache;
mod drift;
mod dump;
mod epistasis;
mod landscape;
mod simulation;

pub mod search;

pub use cache::*;
pub use drift::*;
pub use dump::*;
pub use epistasis::*;
pub use landscape::*;
pub use simulation::*;
