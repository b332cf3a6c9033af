//! Decomposition of sizes without a direct codelet.
//!
//! A size is split as `n = n1 * n2` with `n1` a leaf size, recursing on `n2` until it is a
//! leaf itself.  Sizes with a prime factor no leaf covers are padded and computed as a
//! chirp-z convolution instead.

use fourier_algorithms::bluesteins::min_inner_size;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Default working-set budget in bytes, the size of a typical L1 data cache.
pub const DEFAULT_CACHE_BUDGET: usize = 32 * 1024;

/// Bytes per element assumed unless the caller specifies the precision.
pub const DEFAULT_ELEMENT_BYTES: usize = 16;

/// One pass of a decomposed transform.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Stage {
    /// Size of the leaf transform applied by this pass.
    pub radix: usize,
    /// Product of the radices of every earlier pass.
    ///
    /// The pass operates on sub-transforms of `transform_len / twiddle_stride` points, whose
    /// phase factors are the transform's roots of unity taken at this stride.
    pub twiddle_stride: usize,
}

/// An ordered list of stages covering a transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecompositionStrategy {
    size: usize,
    transform_len: usize,
    stages: Vec<Stage>,
    convolution: bool,
}

impl DecompositionStrategy {
    fn from_radices(size: usize, transform_len: usize, radices: &[usize], convolution: bool) -> Self {
        let mut stride = 1;
        let stages = radices
            .iter()
            .map(|&radix| {
                let stage = Stage {
                    radix,
                    twiddle_stride: stride,
                };
                stride *= radix;
                stage
            })
            .collect();
        Self {
            size,
            transform_len,
            stages,
            convolution,
        }
    }

    /// The size of the planned transform.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The length the stages compute: the size itself, or the padded length of a convolution.
    pub fn transform_len(&self) -> usize {
        self.transform_len
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Returns true if the stages compute a padded transform used for a chirp-z convolution.
    pub fn is_convolution(&self) -> bool {
        self.convolution
    }

    pub fn max_radix(&self) -> usize {
        self.stages
            .iter()
            .map(|stage| stage.radix)
            .max()
            .unwrap_or(1)
    }

    /// Scratch elements needed to execute the strategy, given the scratch its leaf codelets need.
    ///
    /// Covers the ping-pong buffer (plus the padded signal for convolutions) and the
    /// gather/scatter buffers for one leaf.
    pub fn scratch_len(&self, leaf_scratch: usize) -> usize {
        let buffers = if self.convolution { 2 } else { 1 };
        buffers * self.transform_len + 2 * self.max_radix() + leaf_scratch
    }
}

/// Plans decompositions over a fixed set of leaf sizes.
#[derive(Clone, Debug)]
pub struct DecompositionPlanner {
    leaves: Vec<usize>,
    has_leaves: bool,
    cache_budget: usize,
    element_bytes: usize,
}

#[derive(Copy, Clone, Debug)]
struct Split {
    leaf: usize,
    working_set: usize,
    depth: usize,
}

impl Split {
    fn better_than(&self, other: &Split, budget: usize) -> bool {
        match (self.working_set <= budget, other.working_set <= budget) {
            (true, false) => true,
            (false, true) => false,
            // closest to the budget, then fewest stages
            (true, true) => {
                (Reverse(self.working_set), self.depth, Reverse(self.leaf))
                    < (Reverse(other.working_set), other.depth, Reverse(other.leaf))
            }
            (false, false) => {
                (self.working_set, self.depth) < (other.working_set, other.depth)
            }
        }
    }
}

impl DecompositionPlanner {
    pub fn new(leaf_sizes: &[usize], cache_budget: usize) -> Self {
        let mut leaves = leaf_sizes
            .iter()
            .copied()
            .filter(|&size| size > 1)
            .collect::<Vec<_>>();
        leaves.sort_unstable_by(|a, b| b.cmp(a));
        leaves.dedup();
        Self {
            leaves,
            has_leaves: !leaf_sizes.is_empty(),
            cache_budget,
            element_bytes: DEFAULT_ELEMENT_BYTES,
        }
    }

    /// Sets the element width used to convert sizes into working-set bytes.
    pub fn with_element_bytes(mut self, element_bytes: usize) -> Self {
        self.element_bytes = element_bytes;
        self
    }

    /// Plans a transform of `size`, falling back to a convolution if it can't be factored.
    pub fn plan(&self, size: usize) -> Option<DecompositionStrategy> {
        if size == 0 || !self.has_leaves {
            return None;
        }
        if size == 1 {
            return Some(DecompositionStrategy::from_radices(1, 1, &[1], false));
        }
        let mut memo = HashMap::new();
        match self.factor(size, &mut memo) {
            Some(radices) => Some(DecompositionStrategy::from_radices(
                size, size, &radices, false,
            )),
            None => self.convolution(size, &mut memo),
        }
    }

    /// Plans a transform of `size` as a convolution, even if it could be factored.
    pub fn plan_convolution(&self, size: usize) -> Option<DecompositionStrategy> {
        if size == 0 || !self.has_leaves {
            return None;
        }
        self.convolution(size, &mut HashMap::new())
    }

    fn convolution(
        &self,
        size: usize,
        memo: &mut HashMap<usize, Option<Vec<usize>>>,
    ) -> Option<DecompositionStrategy> {
        if self.leaves.is_empty() {
            // only size 1 leaves: nothing larger than 1 is reachable
            return None;
        }
        // powers of any leaf are decomposable, so this terminates
        let mut padded = min_inner_size(size);
        loop {
            if let Some(radices) = self.factor(padded, memo) {
                return Some(DecompositionStrategy::from_radices(
                    size, padded, &radices, true,
                ));
            }
            padded += 1;
        }
    }

    fn factor(
        &self,
        size: usize,
        memo: &mut HashMap<usize, Option<Vec<usize>>>,
    ) -> Option<Vec<usize>> {
        if size == 1 {
            return Some(vec![1]);
        }
        if let Some(known) = memo.get(&size) {
            return known.clone();
        }

        let result = if self.leaves.contains(&size) {
            Some(vec![size])
        } else {
            let mut best: Option<(Split, Vec<usize>)> = None;
            for &leaf in &self.leaves {
                if leaf >= size || size % leaf != 0 {
                    continue;
                }
                let inner = size / leaf;
                if let Some(rest) = self.factor(inner, memo) {
                    let split = Split {
                        leaf,
                        working_set: inner.saturating_mul(self.element_bytes),
                        depth: rest.len() + 1,
                    };
                    let better = best
                        .as_ref()
                        .map_or(true, |(current, _)| split.better_than(current, self.cache_budget));
                    if better {
                        best = Some((split, rest));
                    }
                }
            }
            best.map(|(split, rest)| {
                let mut radices = Vec::with_capacity(rest.len() + 1);
                radices.push(split.leaf);
                radices.extend(rest);
                radices
            })
        };

        memo.insert(size, result.clone());
        result
    }
}

/// Plans a decomposition of `size` over `leaf_sizes`, keeping inner transforms within
/// `cache_budget` bytes where possible.
///
/// Returns `None` only for a zero size or an empty leaf set.
pub fn plan_decomposition(
    size: usize,
    leaf_sizes: &[usize],
    cache_budget: usize,
) -> Option<DecompositionStrategy> {
    DecompositionPlanner::new(leaf_sizes, cache_budget).plan(size)
}

#[cfg(test)]
mod test {
    use super::*;

    const SMALL: [usize; 5] = [2, 3, 4, 5, 8];

    fn radices(strategy: &DecompositionStrategy) -> Vec<usize> {
        strategy.stages().iter().map(|stage| stage.radix).collect()
    }

    fn powers_of_two(max_shift: u32) -> Vec<usize> {
        (1..=max_shift).map(|shift| 1 << shift).collect()
    }

    #[test]
    fn single_leaf() {
        let strategy = plan_decomposition(8, &SMALL, DEFAULT_CACHE_BUDGET).unwrap();
        assert_eq!(
            strategy.stages(),
            &[Stage {
                radix: 8,
                twiddle_stride: 1
            }]
        );
        assert!(!strategy.is_convolution());
        assert_eq!(strategy.transform_len(), 8);
    }

    #[test]
    fn mixed_radix_forty() {
        let strategy = plan_decomposition(40, &SMALL, DEFAULT_CACHE_BUDGET).unwrap();
        // inner 20 (320 bytes) sits closest to the budget
        assert_eq!(radices(&strategy), vec![2, 2, 2, 5]);
        let strides = strategy
            .stages()
            .iter()
            .map(|stage| stage.twiddle_stride)
            .collect::<Vec<_>>();
        assert_eq!(strides, vec![1, 2, 4, 8]);
        assert!(!strategy.is_convolution());

        // a tight budget still picks the largest inner transform that fits
        let strategy = plan_decomposition(40, &SMALL, 128).unwrap();
        assert_eq!(radices(&strategy), vec![5, 8]);
    }

    #[test]
    fn stages_multiply_to_size() {
        for size in 1..=512 {
            let strategy = plan_decomposition(size, &SMALL, DEFAULT_CACHE_BUDGET).unwrap();
            let product: usize = radices(&strategy).iter().product();
            assert_eq!(product, strategy.transform_len(), "size {}", size);
            if strategy.is_convolution() {
                assert!(strategy.transform_len() >= 2 * size - 1);
            } else {
                assert_eq!(strategy.transform_len(), size);
            }
        }
    }

    #[test]
    fn primes_use_convolution() {
        let strategy = plan_decomposition(13, &[2, 4, 8], DEFAULT_CACHE_BUDGET).unwrap();
        assert!(strategy.is_convolution());
        assert_eq!(strategy.size(), 13);
        assert_eq!(strategy.transform_len(), 32);
        assert_eq!(radices(&strategy), vec![2, 2, 8]);

        let strategy = plan_decomposition(7, &SMALL, DEFAULT_CACHE_BUDGET).unwrap();
        assert!(strategy.is_convolution());
        assert_eq!(strategy.transform_len(), 15);
    }

    #[test]
    fn forced_convolution() {
        let planner = DecompositionPlanner::new(&SMALL, DEFAULT_CACHE_BUDGET);
        let strategy = planner.plan_convolution(16).unwrap();
        assert!(strategy.is_convolution());
        assert_eq!(strategy.transform_len(), 32);
    }

    #[test]
    fn none_without_leaves() {
        assert_eq!(plan_decomposition(0, &SMALL, DEFAULT_CACHE_BUDGET), None);
        assert_eq!(plan_decomposition(16, &[], DEFAULT_CACHE_BUDGET), None);
        assert_eq!(
            radices(&plan_decomposition(1, &SMALL, DEFAULT_CACHE_BUDGET).unwrap()),
            vec![1]
        );
    }

    #[test]
    fn budget_keeps_inner_transform_resident() {
        let leaves = powers_of_two(11);
        let strategy = plan_decomposition(4096, &leaves, DEFAULT_CACHE_BUDGET).unwrap();
        assert_eq!(radices(&strategy), vec![2, 2048]);

        let strategy = plan_decomposition(4096, &leaves, 1024).unwrap();
        assert_eq!(radices(&strategy), vec![64, 64]);

        // nothing fits: smallest inner transform
        let strategy = plan_decomposition(4096, &leaves, 0).unwrap();
        assert_eq!(radices(&strategy), vec![2048, 2]);
    }

    #[test]
    fn element_width_scales_budget() {
        let leaves = powers_of_two(16);
        let wide = plan_decomposition(1 << 17, &leaves, DEFAULT_CACHE_BUDGET).unwrap();
        assert_eq!(radices(&wide), vec![64, 2048]);

        let narrow = DecompositionPlanner::new(&leaves, DEFAULT_CACHE_BUDGET)
            .with_element_bytes(8)
            .plan(1 << 17)
            .unwrap();
        assert_eq!(radices(&narrow), vec![32, 4096]);
    }

    #[test]
    fn scratch_covers_buffers() {
        let strategy = plan_decomposition(40, &SMALL, DEFAULT_CACHE_BUDGET).unwrap();
        assert_eq!(strategy.scratch_len(0), 40 + 10);
        let strategy = plan_decomposition(13, &[2, 4, 8], DEFAULT_CACHE_BUDGET).unwrap();
        assert_eq!(strategy.scratch_len(3), 64 + 16 + 3);
    }
}
