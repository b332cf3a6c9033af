//! Executable form of a resolved kernel.
//!
//! Everything here is computed once when a plan is built and is read-only afterwards; the only
//! mutable state during execution is the caller's scratch buffer.

use crate::decompose::DecompositionStrategy;
use crate::dispatch::{ResolvedDecomposition, ResolvedKernel};
use crate::registry::{CodeletEntry, Family};
use fourier_algorithms::autosort::butterfly::butterfly;
use fourier_algorithms::{bluesteins, compute_twiddle, roots, Float};
use num_complex::Complex;

/// A codelet with its permutation generated.
struct Bound<T> {
    entry: CodeletEntry<T>,
    permutation: Option<Box<[usize]>>,
}

impl<T: Float> Bound<T> {
    fn new(entry: CodeletEntry<T>) -> Self {
        let permutation = entry
            .permutation()
            .map(|generate| generate(entry.size()).into_boxed_slice());
        Self { entry, permutation }
    }

    #[inline]
    fn call(
        &self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        twiddles: &[Complex<T>],
        scratch: &mut [Complex<T>],
        forward: bool,
    ) -> bool {
        let codelet = if forward {
            self.entry.forward()
        } else {
            self.entry.inverse()
        };
        codelet(dst, src, twiddles, scratch, self.permutation.as_deref())
    }
}

/// Forward and inverse twiddle buffers with the same layout.
struct Twiddles<T> {
    forward: Box<[Complex<T>]>,
    inverse: Box<[Complex<T>]>,
}

impl<T: Float> Twiddles<T> {
    fn roots(size: usize) -> Self {
        Self {
            forward: roots(size, true).into_boxed_slice(),
            inverse: roots(size, false).into_boxed_slice(),
        }
    }

    #[inline]
    fn get(&self, forward: bool) -> &[Complex<T>] {
        if forward {
            &self.forward
        } else {
            &self.inverse
        }
    }
}

/// Codelets for one leaf size, ending with the generic butterfly.
struct LeafChain<T> {
    radix: usize,
    candidates: Box<[Bound<T>]>,
    roots: Twiddles<T>,
    scratch_len: usize,
}

impl<T: Float> LeafChain<T> {
    fn new(radix: usize, candidates: &[CodeletEntry<T>]) -> Self {
        Self {
            radix,
            candidates: candidates.iter().copied().map(Bound::new).collect(),
            roots: Twiddles::roots(radix),
            scratch_len: candidates
                .iter()
                .map(CodeletEntry::scratch_len)
                .max()
                .unwrap_or(0),
        }
    }

    #[inline]
    fn execute(
        &self,
        output: &mut [Complex<T>],
        input: &[Complex<T>],
        scratch: &mut [Complex<T>],
        forward: bool,
    ) {
        let roots = self.roots.get(forward);
        for candidate in self.candidates.iter() {
            if candidate.call(output, input, roots, scratch, forward) {
                return;
            }
        }
        butterfly(input, output, roots);
    }
}

/// One stage of a decomposition, laid out like a Stockham pass.
#[derive(Copy, Clone, Debug)]
struct Pass {
    radix: usize,
    size: usize,
    stride: usize,
    twiddle_offset: usize,
    leaf: usize,
}

impl Pass {
    #[allow(clippy::too_many_arguments)]
    #[inline]
    fn apply<T: Float>(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        gather: &mut [Complex<T>],
        scatter: &mut [Complex<T>],
        leaf: &LeafChain<T>,
        leaf_scratch: &mut [Complex<T>],
        twiddles: &[Complex<T>],
        forward: bool,
    ) {
        let radix = self.radix;
        let stride = self.stride;
        let m = self.size / radix;
        let gather = &mut gather[..radix];
        let scatter = &mut scatter[..radix];
        for p in 0..m {
            for q in 0..stride {
                for (k, x) in gather.iter_mut().enumerate() {
                    *x = input[q + stride * (p + k * m)];
                }
                leaf.execute(scatter, gather, leaf_scratch, forward);
                let base = q + stride * p * radix;
                if p == 0 {
                    for (j, y) in scatter.iter().enumerate() {
                        output[base + stride * j] = *y;
                    }
                } else {
                    let twiddles = &twiddles[p * radix..(p + 1) * radix];
                    for (j, (y, w)) in scatter.iter().zip(twiddles).enumerate() {
                        output[base + stride * j] = y * w;
                    }
                }
            }
        }
    }
}

/// Chirp and frequency-domain filter for each direction.
struct Chirp<T> {
    forward: Box<[Complex<T>]>,
    inverse: Box<[Complex<T>]>,
    forward_response: Box<[Complex<T>]>,
    inverse_response: Box<[Complex<T>]>,
}

/// A decomposition ready to execute.
pub(crate) struct Decomposed<T> {
    strategy: DecompositionStrategy,
    passes: Box<[Pass]>,
    leaves: Box<[LeafChain<T>]>,
    twiddles: Twiddles<T>,
    chirp: Option<Chirp<T>>,
    scratch_len: usize,
}

impl<T: Float> Decomposed<T> {
    fn new(resolved: &ResolvedDecomposition<T>) -> Self {
        let strategy = resolved.strategy().clone();
        let len = strategy.transform_len();
        let leaves = resolved
            .leaves()
            .iter()
            .map(|(radix, candidates)| LeafChain::new(*radix, candidates))
            .collect::<Box<[_]>>();

        // packed twiddles: element (p, j) of a pass is w^(p*j) for the pass size
        let mut forward = Vec::new();
        let mut inverse = Vec::new();
        let mut passes = Vec::with_capacity(strategy.stages().len());
        for stage in strategy.stages() {
            let size = len / stage.twiddle_stride;
            let twiddle_offset = forward.len();
            for p in 0..size / stage.radix {
                for j in 0..stage.radix {
                    forward.push(compute_twiddle(p * j, size, true));
                    inverse.push(compute_twiddle(p * j, size, false));
                }
            }
            passes.push(Pass {
                radix: stage.radix,
                size,
                stride: stage.twiddle_stride,
                twiddle_offset,
                leaf: leaves
                    .iter()
                    .position(|leaf| leaf.radix == stage.radix)
                    .unwrap_or_default(),
            });
        }

        let leaf_scratch = leaves
            .iter()
            .map(|leaf| leaf.scratch_len)
            .max()
            .unwrap_or(0);
        let mut decomposed = Self {
            scratch_len: strategy.scratch_len(leaf_scratch),
            strategy,
            passes: passes.into_boxed_slice(),
            leaves,
            twiddles: Twiddles {
                forward: forward.into_boxed_slice(),
                inverse: inverse.into_boxed_slice(),
            },
            chirp: None,
        };

        if decomposed.strategy.is_convolution() {
            let size = decomposed.strategy.size();
            let mut scratch = vec![Complex::default(); decomposed.scratch_len];
            let forward_response = decomposed.response(size, true, &mut scratch);
            let inverse_response = decomposed.response(size, false, &mut scratch);
            decomposed.chirp = Some(Chirp {
                forward: bluesteins::chirp(size, true).into_boxed_slice(),
                inverse: bluesteins::chirp(size, false).into_boxed_slice(),
                forward_response,
                inverse_response,
            });
        }
        decomposed
    }

    /// Transforms the convolution kernel of one direction into its frequency response.
    fn response(
        &self,
        size: usize,
        forward: bool,
        scratch: &mut [Complex<T>],
    ) -> Box<[Complex<T>]> {
        let len = self.strategy.transform_len();
        let mut kernel = bluesteins::filter::<T>(size, len, forward);
        let (work, rest) = scratch.split_at_mut(len);
        self.run(&mut kernel, work, rest, true);
        kernel.into_boxed_slice()
    }

    /// Runs every pass over `data`, leaving the transform in `data`.
    fn run(
        &self,
        data: &mut [Complex<T>],
        work: &mut [Complex<T>],
        rest: &mut [Complex<T>],
        forward: bool,
    ) {
        let work = &mut work[..data.len()];
        let max_radix = self.strategy.max_radix();
        let (gather, rest) = rest.split_at_mut(max_radix);
        let (scatter, leaf_scratch) = rest.split_at_mut(max_radix);
        let twiddles = self.twiddles.get(forward);

        let mut data_in_work = false;
        for pass in self.passes.iter() {
            let leaf = &self.leaves[pass.leaf];
            let twiddles = &twiddles[pass.twiddle_offset..pass.twiddle_offset + pass.size];
            let (from, to): (&[Complex<T>], &mut [Complex<T>]) = if data_in_work {
                (&*work, &mut *data)
            } else {
                (&*data, &mut *work)
            };
            pass.apply(
                from,
                to,
                gather,
                scatter,
                leaf,
                leaf_scratch,
                twiddles,
                forward,
            );
            data_in_work = !data_in_work;
        }
        if data_in_work {
            data.copy_from_slice(work);
        }
    }

    fn execute(
        &self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        scratch: &mut [Complex<T>],
        forward: bool,
    ) {
        let len = self.strategy.transform_len();
        match &self.chirp {
            None => {
                dst.copy_from_slice(src);
                let (work, rest) = scratch.split_at_mut(len);
                self.run(dst, work, rest, forward);
            }
            Some(chirp) => {
                let (signal, rest) = scratch.split_at_mut(len);
                let (work, rest) = rest.split_at_mut(len);
                let (chirp, response) = if forward {
                    (&chirp.forward, &chirp.forward_response)
                } else {
                    (&chirp.inverse, &chirp.inverse_response)
                };

                let (head, tail) = signal.split_at_mut(src.len());
                for ((y, x), c) in head.iter_mut().zip(src).zip(chirp.iter()) {
                    *y = x * c;
                }
                for y in tail {
                    *y = Complex::default();
                }

                self.run(signal, work, rest, true);
                for (y, h) in signal.iter_mut().zip(response.iter()) {
                    *y *= *h;
                }
                self.run(signal, work, rest, false);

                let scale = T::one() / T::from_usize(len).unwrap_or_else(T::nan);
                for ((y, x), c) in dst.iter_mut().zip(signal.iter()).zip(chirp.iter()) {
                    *y = x * c * scale;
                }
            }
        }
    }
}

enum Backstop<T> {
    Decomposed(Decomposed<T>),
    /// Direct summation, used when no other leaves exist.
    Direct,
}

/// A bound kernel: codelet chain, backstop, and all precomputed tables.
pub(crate) struct Kernel<T> {
    size: usize,
    family: Family,
    name: &'static str,
    roots: Twiddles<T>,
    chain: Box<[Bound<T>]>,
    backstop: Backstop<T>,
    scratch_len: usize,
}

impl<T: Float> Kernel<T> {
    pub(crate) fn bind(resolved: &ResolvedKernel<T>) -> Self {
        let size = resolved.size();
        let chain = resolved
            .chain()
            .iter()
            .copied()
            .map(Bound::new)
            .collect::<Box<[_]>>();
        let backstop = match resolved.decomposition() {
            Some(decomposition) => Backstop::Decomposed(Decomposed::new(decomposition)),
            None => Backstop::Direct,
        };

        // the decomposition carries its own tables
        let needs_roots = !chain.is_empty() || matches!(backstop, Backstop::Direct);
        let roots = Twiddles::roots(if needs_roots { size } else { 0 });

        let backstop_scratch = match &backstop {
            Backstop::Decomposed(decomposed) => decomposed.scratch_len,
            Backstop::Direct => 0,
        };
        let scratch_len = chain
            .iter()
            .map(|bound| bound.entry.scratch_len())
            .fold(backstop_scratch, usize::max);

        Self {
            size,
            family: resolved.family(),
            name: resolved.name(),
            roots,
            chain,
            backstop,
            scratch_len,
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn family(&self) -> Family {
        self.family
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn scratch_len(&self) -> usize {
        self.scratch_len
    }

    /// The decomposition, if it is the primary kernel.
    pub(crate) fn strategy(&self) -> Option<&DecompositionStrategy> {
        match &self.backstop {
            Backstop::Decomposed(decomposed) if self.chain.is_empty() => {
                Some(&decomposed.strategy)
            }
            _ => None,
        }
    }

    /// Computes an unnormalized transform of `src` into `dst`.
    ///
    /// `scratch` must hold at least `scratch_len()` elements.
    pub(crate) fn execute(
        &self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        scratch: &mut [Complex<T>],
        forward: bool,
    ) {
        let roots = self.roots.get(forward);
        for bound in self.chain.iter() {
            if bound.call(dst, src, roots, scratch, forward) {
                return;
            }
        }
        match &self.backstop {
            Backstop::Decomposed(decomposed) => decomposed.execute(dst, src, scratch, forward),
            Backstop::Direct => butterfly(src, dst, roots),
        }
    }
}
