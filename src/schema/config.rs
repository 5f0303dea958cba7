//! Configuration types for NK landscape construction.

use serde::{Deserialize, Serialize};

/// Immutable constants that fix the shape of a landscape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandscapeConfig {
    /// Number of loci (bits per point).
    pub n: usize,
    /// Ring-group size minus one. Every `even_k + 1` consecutive loci are
    /// fully linked to each other.
    #[serde(default)]
    pub even_k: usize,
    /// Extra forward links appended after the ring group.
    #[serde(default)]
    pub aft_overlap: usize,
    /// Extra backward links appended before the ring group.
    #[serde(default)]
    pub fore_overlap: usize,
    /// Seed for leaf value draws. `None` draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            n: 16,
            even_k: 3,
            aft_overlap: 0,
            fore_overlap: 0,
            seed: None,
        }
    }
}

impl LandscapeConfig {
    /// Create a configuration without a fixed seed.
    pub fn new(n: usize, even_k: usize, aft_overlap: usize, fore_overlap: usize) -> Self {
        Self {
            n,
            even_k,
            aft_overlap,
            fore_overlap,
            seed: None,
        }
    }

    /// Builder-style seed override.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of links each locus carries besides itself.
    #[inline]
    pub fn nlink(&self) -> usize {
        self.even_k + self.aft_overlap + self.fore_overlap
    }

    /// Same loci count, each locus depending only on itself.
    pub fn degenerate(&self) -> Self {
        Self {
            n: self.n,
            even_k: 0,
            aft_overlap: 0,
            fore_overlap: 0,
            seed: self.seed,
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n == 0 {
            return Err(ConfigError::EmptyLandscape);
        }
        if self.nlink() >= self.n {
            return Err(ConfigError::TooManyLinks {
                even_k: self.even_k,
                aft_overlap: self.aft_overlap,
                fore_overlap: self.fore_overlap,
                n: self.n,
            });
        }
        Ok(())
    }
}

/// Landscape configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Landscape must have at least one locus")]
    EmptyLandscape,
    #[error(
        "EvenK ({even_k}) + AftOverlap ({aft_overlap}) + ForeOverlap ({fore_overlap}) must be below N ({n})"
    )]
    TooManyLinks {
        even_k: usize,
        aft_overlap: usize,
        fore_overlap: usize,
        n: usize,
    },
}
