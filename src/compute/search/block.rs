//! Block decomposition of a point and the shared mutation proposal.

use std::ops::Range;

use rand::Rng;

/// Partition of `[0, N)` into contiguous, non-empty blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    blocks: Vec<Range<usize>>,
    n: usize,
}

impl BlockLayout {
    /// Validate caller-supplied blocks against a point of `n` loci.
    pub fn new(blocks: Vec<Range<usize>>, n: usize) -> Result<Self, LayoutError> {
        if blocks.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut expected = 0;
        for (i, block) in blocks.iter().enumerate() {
            if block.start != expected {
                return Err(LayoutError::Gap {
                    block: i,
                    expected,
                    found: block.start,
                });
            }
            if block.is_empty() {
                return Err(LayoutError::EmptyBlock(i));
            }
            expected = block.end;
        }

        if expected != n {
            return Err(LayoutError::Coverage { covered: expected, n });
        }

        Ok(Self { blocks, n })
    }

    /// Consecutive blocks of `size` loci; the last one may be shorter.
    pub fn uniform(n: usize, size: usize) -> Result<Self, LayoutError> {
        if size == 0 {
            return Err(LayoutError::ZeroBlockSize);
        }
        let blocks = (0..n)
            .step_by(size)
            .map(|start| start..(start + size).min(n))
            .collect();
        Self::new(blocks, n)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: construction rejects empty layouts.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of loci covered.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Loci of block `index`.
    pub fn block(&self, index: usize) -> Option<Range<usize>> {
        self.blocks.get(index).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.blocks.iter().cloned()
    }

    /// Index of the block containing `locus`.
    pub fn block_of(&self, locus: usize) -> Option<usize> {
        self.blocks.iter().position(|block| block.contains(&locus))
    }
}

/// Block layout errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Block layout has no blocks")]
    Empty,
    #[error("Block size must be positive")]
    ZeroBlockSize,
    #[error("Block {block} starts at {found}, expected {expected}")]
    Gap {
        block: usize,
        expected: usize,
        found: usize,
    },
    #[error("Block {0} is empty")]
    EmptyBlock(usize),
    #[error("Blocks cover {covered} loci, point has {n}")]
    Coverage { covered: usize, n: usize },
}

/// Mutate `block` of `point` in place.
///
/// One bit, chosen uniformly, is always flipped; every other bit of the
/// block flips independently with probability `prob_mut`. Returns the
/// flipped loci in ascending order.
pub fn propose_mutation<R: Rng + ?Sized>(
    point: &mut [bool],
    block: Range<usize>,
    prob_mut: f64,
    rng: &mut R,
) -> Vec<usize> {
    let forced = rng.gen_range(block.clone());

    let flipped: Vec<usize> = block
        .filter(|&locus| locus == forced || rng.r#gen::<f64>() < prob_mut)
        .collect();

    flip_all(point, &flipped);
    flipped
}

/// Toggle every listed locus.
#[inline]
pub fn flip_all(point: &mut [bool], loci: &[usize]) {
    for &locus in loci {
        point[locus] = !point[locus];
    }
}

/// Number of positions where two points differ.
#[inline]
pub fn hamming(a: &[bool], b: &[bool]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_uniform_layout() {
        let layout = BlockLayout::uniform(10, 4).unwrap();
        let blocks: Vec<_> = layout.iter().collect();
        assert_eq!(blocks, vec![0..4, 4..8, 8..10]);
        assert_eq!(layout.block_of(9), Some(2));
        assert_eq!(layout.block(3), None);
    }

    #[test]
    fn test_layout_validation() {
        assert_eq!(BlockLayout::new(vec![], 4), Err(LayoutError::Empty));
        assert_eq!(
            BlockLayout::new(vec![0..2, 3..4], 4),
            Err(LayoutError::Gap {
                block: 1,
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            BlockLayout::new(vec![0..2, 2..2, 2..4], 4),
            Err(LayoutError::EmptyBlock(1))
        );
        assert_eq!(
            BlockLayout::new(vec![0..3], 4),
            Err(LayoutError::Coverage { covered: 3, n: 4 })
        );
        assert_eq!(BlockLayout::uniform(4, 0), Err(LayoutError::ZeroBlockSize));
        assert!(BlockLayout::new(vec![0..1, 1..4], 4).is_ok());
    }

    #[test]
    fn test_forced_flip_only() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            let mut point = vec![false; 8];
            let flipped = propose_mutation(&mut point, 2..6, 0.0, &mut rng);
            assert_eq!(flipped.len(), 1);
            assert!((2..6).contains(&flipped[0]));
            assert_eq!(hamming(&point, &[false; 8]), 1);
        }
    }

    #[test]
    fn test_flip_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut point = vec![false, true, false, true, false];
        let flipped = propose_mutation(&mut point, 1..4, 1.0, &mut rng);
        assert_eq!(flipped, vec![1, 2, 3]);
        assert_eq!(point, vec![false, false, true, false, false]);
    }

    #[test]
    fn test_flip_all_restores() {
        let original = vec![true, false, true, true];
        let mut point = original.clone();
        flip_all(&mut point, &[0, 3]);
        assert_eq!(hamming(&point, &original), 2);
        flip_all(&mut point, &[0, 3]);
        assert_eq!(point, original);
    }
}
