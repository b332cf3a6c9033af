//! Resolution of a transform size to an ordered chain of kernels.

use crate::decompose::{DecompositionPlanner, DecompositionStrategy};
use crate::error::Error;
use crate::features::Features;
use crate::registry::{CodeletEntry, Family, Registry};
use crate::Float;
use num_complex::Complex;
use std::collections::BTreeMap;

/// A decomposition together with the codelet chain for each of its leaf sizes.
#[derive(Clone, Debug)]
pub struct ResolvedDecomposition<T> {
    strategy: DecompositionStrategy,
    leaves: BTreeMap<usize, Vec<CodeletEntry<T>>>,
}

impl<T> ResolvedDecomposition<T> {
    pub fn strategy(&self) -> &DecompositionStrategy {
        &self.strategy
    }

    /// Candidate codelets for each leaf size, best first.
    ///
    /// An empty chain is valid: leaves always end with a generic butterfly.
    pub fn leaves(&self) -> &BTreeMap<usize, Vec<CodeletEntry<T>>> {
        &self.leaves
    }
}

/// The outcome of dispatch: the kernels to try, in order.
///
/// Codelets in [`chain`] are tried first.  The decomposition runs when the chain is empty or
/// every codelet declines; if there is none, a direct DFT ends the chain.
///
/// [`chain`]: #method.chain
#[derive(Clone, Debug)]
pub struct ResolvedKernel<T> {
    size: usize,
    family: Family,
    chain: Vec<CodeletEntry<T>>,
    decomposition: Option<ResolvedDecomposition<T>>,
}

impl<T> ResolvedKernel<T> {
    pub fn size(&self) -> usize {
        self.size
    }

    /// The family of the primary kernel.
    pub fn family(&self) -> Family {
        self.family
    }

    pub fn chain(&self) -> &[CodeletEntry<T>] {
        &self.chain
    }

    pub fn decomposition(&self) -> Option<&ResolvedDecomposition<T>> {
        self.decomposition.as_ref()
    }

    /// The decomposition, if it is the primary kernel rather than a fallback.
    pub fn strategy(&self) -> Option<&DecompositionStrategy> {
        if self.chain.is_empty() {
            self.decomposition.as_ref().map(ResolvedDecomposition::strategy)
        } else {
            None
        }
    }

    /// Diagnostic name of the primary kernel.
    pub fn name(&self) -> &'static str {
        self.chain
            .first()
            .map_or_else(|| self.family.name(), CodeletEntry::name)
    }
}

/// Selects kernels from a registry for a set of capabilities.
#[derive(Debug)]
pub struct Dispatcher<'a, T> {
    registry: &'a Registry<T>,
    features: Features,
    cache_budget: usize,
}

impl<'a, T: Float> Dispatcher<'a, T> {
    pub fn new(registry: &'a Registry<T>, features: Features, cache_budget: usize) -> Self {
        Self {
            registry,
            features,
            cache_budget,
        }
    }

    pub fn features(&self) -> Features {
        self.features
    }

    /// Resolves `size`, optionally restricted to one family.
    pub fn resolve(&self, size: usize, forced: Option<Family>) -> Result<ResolvedKernel<T>, Error> {
        if size == 0 {
            return Err(Error::InvalidLength(size));
        }
        let not_implemented = || Error::NotImplemented {
            size,
            precision: T::PRECISION,
            family: forced,
        };

        let leaves = self.registry.leaf_sizes(&self.features);
        let resolved = match forced {
            Some(Family::Bluestein) => {
                let strategy = self
                    .planner(&leaves)
                    .plan_convolution(size)
                    .ok_or_else(not_implemented)?;
                self.decomposed(size, strategy)
            }
            Some(Family::Recursive) => {
                let strategy = self
                    .planner(&leaves)
                    .plan(size)
                    .ok_or_else(not_implemented)?;
                self.decomposed(size, strategy)
            }
            _ => {
                let chain = self
                    .registry
                    .candidates(size, self.features, forced)
                    .copied()
                    .collect::<Vec<_>>();
                match chain.first() {
                    Some(primary) => {
                        let family = primary.family();
                        let others = leaves
                            .iter()
                            .copied()
                            .filter(|&leaf| leaf != size)
                            .collect::<Vec<_>>();
                        let fallback = self.planner(&others).plan(size);
                        ResolvedKernel {
                            size,
                            family,
                            chain,
                            decomposition: fallback.map(|strategy| self.with_leaves(strategy)),
                        }
                    }
                    None if forced.is_some() => return Err(not_implemented()),
                    None => {
                        let strategy = self
                            .planner(&leaves)
                            .plan(size)
                            .ok_or_else(not_implemented)?;
                        self.decomposed(size, strategy)
                    }
                }
            }
        };

        tracing::debug!(
            size,
            family = %resolved.family,
            kernel = resolved.name(),
            candidates = resolved.chain.len(),
            fallback = resolved.decomposition.is_some(),
            "resolved kernel"
        );
        Ok(resolved)
    }

    fn planner(&self, leaves: &[usize]) -> DecompositionPlanner {
        DecompositionPlanner::new(leaves, self.cache_budget)
            .with_element_bytes(std::mem::size_of::<Complex<T>>())
    }

    fn decomposed(&self, size: usize, strategy: DecompositionStrategy) -> ResolvedKernel<T> {
        let family = if strategy.is_convolution() {
            Family::Bluestein
        } else {
            Family::Recursive
        };
        ResolvedKernel {
            size,
            family,
            chain: Vec::new(),
            decomposition: Some(self.with_leaves(strategy)),
        }
    }

    fn with_leaves(&self, strategy: DecompositionStrategy) -> ResolvedDecomposition<T> {
        let mut leaves = BTreeMap::new();
        for stage in strategy.stages() {
            leaves.entry(stage.radix).or_insert_with(|| {
                self.registry
                    .candidates(stage.radix, self.features, None)
                    .copied()
                    .collect()
            });
        }
        ResolvedDecomposition { strategy, leaves }
    }
}
