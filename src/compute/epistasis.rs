//! Epistatic dependency structure of an NK landscape.
//!
//! Loci are grouped into consecutive rings of `even_k + 1`. Within a ring
//! every locus depends on every other one. Each locus additionally depends
//! on the `aft_overlap` loci following its ring and the `fore_overlap`
//! loci preceding it, wrapping around the ends of the point.

use log::warn;

use crate::schema::{ConfigError, LandscapeConfig};

/// Fixed mapping from each locus to the loci its contribution depends on.
#[derive(Debug, Clone)]
pub struct EpistasisGraph {
    config: LandscapeConfig,
    links: Vec<Vec<usize>>,
    clamped: bool,
}

impl EpistasisGraph {
    /// Build the dependency tuples for a configuration.
    ///
    /// A configuration with `even_k + aft_overlap + fore_overlap >= n` is
    /// clamped to the degenerate one (every locus depends only on itself)
    /// with a warning. Only an empty landscape is an error.
    pub fn build(config: &LandscapeConfig) -> Result<Self, ConfigError> {
        let (config, clamped) = match config.validate() {
            Ok(()) => (config.clone(), false),
            Err(ConfigError::EmptyLandscape) => return Err(ConfigError::EmptyLandscape),
            Err(err) => {
                warn!("{err}; falling back to EvenK=0, AftOverlap=0, ForeOverlap=0");
                (config.degenerate(), true)
            }
        };

        let n = config.n;
        let group = config.even_k + 1;

        let links = (0..n)
            .map(|locus| {
                let start = (locus / group) * group;
                let mut tuple = Vec::with_capacity(config.nlink());

                // Ring neighbors, from the group's first locus forward
                tuple.extend(
                    (0..group)
                        .map(|j| (start + j) % n)
                        .filter(|&other| other != locus),
                );
                // Forward cross-links after the ring
                tuple.extend((0..config.aft_overlap).map(|j| (start + group + j) % n));
                // Backward cross-links before the ring
                tuple.extend((0..config.fore_overlap).map(|j| (start + n - 1 - j) % n));

                tuple
            })
            .collect();

        Ok(Self {
            config,
            links,
            clamped,
        })
    }

    /// Effective configuration (after any clamping).
    pub fn config(&self) -> &LandscapeConfig {
        &self.config
    }

    /// Whether the requested configuration was clamped.
    pub fn was_clamped(&self) -> bool {
        self.clamped
    }

    /// Number of loci.
    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always false: construction rejects empty landscapes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Links per locus, not counting the locus itself.
    #[inline]
    pub fn nlink(&self) -> usize {
        self.config.nlink()
    }

    /// Dependency tuple of a locus.
    #[inline]
    pub fn links(&self, locus: usize) -> &[usize] {
        &self.links[locus]
    }

    /// Fill `out` with the state sequence that keys a locus's contribution:
    /// the locus's own bit followed by the bits of its dependency tuple.
    pub fn gather_states(&self, locus: usize, point: &[bool], out: &mut Vec<bool>) {
        out.clear();
        out.push(point[locus]);
        out.extend(self.links[locus].iter().map(|&other| point[other]));
    }

    /// Whether `locus`'s contribution depends on `other`.
    pub fn depends_on(&self, locus: usize, other: usize) -> bool {
        locus == other || self.links[locus].contains(&other)
    }
}
