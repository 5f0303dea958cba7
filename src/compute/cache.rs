//! Lazily grown memoization of locus fitness contributions.
//!
//! Every locus owns a binary trie keyed by its dependency-state sequence.
//! A node exists only once its exact prefix has been visited; a leaf sits
//! at full sequence depth and holds a value drawn uniformly from `[0, 1)`
//! the first time it is reached. Leaves never change afterwards unless the
//! whole locus is resampled.
//!
//! # Memory
//!
//! The cache never evicts. The number of leaves per locus is bounded only
//! by `2^(nlink + 1)` and by how much of that space the search visits. When
//! the allocator runs out of memory the process aborts; this is a known
//! boundary of the design and is not caught here.

use log::debug;
use rand::prelude::*;

#[derive(Debug, Clone)]
enum Node {
    Branch([Option<Box<Node>>; 2]),
    Leaf(f64),
}

impl Node {
    fn branch() -> Box<Self> {
        Box::new(Node::Branch([None, None]))
    }

    fn count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Branch(children) => {
                1 + children
                    .iter()
                    .flatten()
                    .map(|child| child.count())
                    .sum::<usize>()
            }
        }
    }
}

/// Sparse, on-demand fitness contributions for every locus.
#[derive(Debug, Clone)]
pub struct FitnessCache {
    tries: Vec<Option<Box<Node>>>,
    leaves: Vec<usize>,
    nodes: usize,
    depth: usize,
    version: u64,
    rng: StdRng,
}

impl FitnessCache {
    /// Create an empty cache for `loci` tries keyed by `depth` bits each.
    ///
    /// `seed` fixes the sequence of leaf draws; `None` draws from entropy.
    pub fn new(loci: usize, depth: usize, seed: Option<u64>) -> Self {
        assert!(depth > 0, "state sequences include at least the locus itself");
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Self {
            tries: vec![None; loci],
            leaves: vec![0; loci],
            nodes: 0,
            depth,
            version: 0,
            rng,
        }
    }

    /// Contribution of `locus` under `states`, creating the path on first
    /// visit.
    ///
    /// # Panics
    ///
    /// Panics if `states` does not have the cache's key depth.
    pub fn contribution(&mut self, locus: usize, states: &[bool]) -> f64 {
        assert_eq!(
            states.len(),
            self.depth,
            "state sequence length does not match cache depth"
        );

        let Self {
            tries,
            leaves,
            nodes,
            rng,
            ..
        } = self;

        let mut slot = &mut tries[locus];
        for &bit in states {
            let node = slot.get_or_insert_with(|| {
                *nodes += 1;
                Node::branch()
            });
            slot = match &mut **node {
                Node::Branch(children) => &mut children[usize::from(bit)],
                Node::Leaf(_) => unreachable!("leaf above full key depth"),
            };
        }

        let leaf = slot.get_or_insert_with(|| {
            *nodes += 1;
            leaves[locus] += 1;
            Box::new(Node::Leaf(rng.r#gen::<f64>()))
        });

        match &**leaf {
            Node::Leaf(value) => *value,
            Node::Branch(_) => unreachable!("branch at full key depth"),
        }
    }

    /// Contribution of `locus` under `states` if it has been visited.
    pub fn peek(&self, locus: usize, states: &[bool]) -> Option<f64> {
        if states.len() != self.depth {
            return None;
        }

        let mut node = self.tries[locus].as_deref()?;
        for &bit in states {
            node = match node {
                Node::Branch(children) => children[usize::from(bit)].as_deref()?,
                Node::Leaf(_) => return None,
            };
        }

        match node {
            Node::Leaf(value) => Some(*value),
            Node::Branch(_) => None,
        }
    }

    /// Drop every cached contribution of `locus`. The next query redraws.
    pub fn resample(&mut self, locus: usize) {
        if let Some(root) = self.tries[locus].take() {
            self.nodes -= root.count();
        }
        debug!(
            "Resampled locus {locus}, dropped {} leaves",
            self.leaves[locus]
        );
        self.leaves[locus] = 0;
        self.version += 1;
    }

    /// Drop every cached contribution of every locus.
    pub fn clear(&mut self) {
        self.tries.iter_mut().for_each(|trie| *trie = None);
        self.leaves.iter_mut().for_each(|count| *count = 0);
        self.nodes = 0;
        self.version += 1;
    }

    /// Number of loci.
    pub fn loci(&self) -> usize {
        self.tries.len()
    }

    /// Key depth (bits per state sequence).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Distinct state sequences cached for `locus`.
    pub fn leaf_count(&self, locus: usize) -> usize {
        self.leaves[locus]
    }

    /// Distinct state sequences cached over all loci.
    pub fn total_leaves(&self) -> usize {
        self.leaves.iter().sum()
    }

    /// Trie nodes (branches and leaves) currently allocated.
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Counter bumped by every resample or clear.
    pub fn version(&self) -> u64 {
        self.version
    }
}
