//! Schema module - Configuration and result types for NK landscape runs.

mod config;
mod simulation;

pub use config::*;
pub use simulation::*;
