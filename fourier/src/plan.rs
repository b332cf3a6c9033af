//! Plan construction and execution.

use crate::benchmark::Benchmark;
use crate::decompose::{DecompositionStrategy, DEFAULT_CACHE_BUDGET};
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::features::Features;
use crate::fft::{check_len, Fft, Transform};
use crate::kernel::Kernel;
use crate::registry::{Family, Registry};
use crate::wisdom::{global_wisdom, Wisdom, WisdomEntry, WisdomKey};
use crate::Float;
use num_complex::Complex;
use std::cell::RefCell;
use std::sync::Arc;

/// How much effort the planner spends choosing an algorithm.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlannerMode {
    /// Use wisdom if present, otherwise pick by priority without timing.
    #[default]
    Estimate,
    /// Time each codelet family briefly.
    Measure,
    /// Time each codelet family for longer.
    Patient,
    /// Time every family, including Bluestein's algorithm.
    Exhaustive,
}

impl PlannerMode {
    /// The benchmark used to compare candidates, or `None` if the mode does not measure.
    pub fn benchmark(self) -> Option<Benchmark> {
        match self {
            Self::Estimate => None,
            Self::Measure => Some(Benchmark::MEASURE),
            Self::Patient => Some(Benchmark::PATIENT),
            Self::Exhaustive => Some(Benchmark::EXHAUSTIVE),
        }
    }

    fn considers(self, family: Family) -> bool {
        family != Family::Bluestein || self == Self::Exhaustive
    }
}

/// Options controlling plan construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlanOptions {
    pub planner: PlannerMode,
    /// Force an algorithm family, bypassing wisdom and measurement.
    pub strategy: Option<Family>,
    /// Bytes the inner transform of a decomposition should fit in.
    pub cache_budget: usize,
    /// Capabilities to plan for, or `None` to detect them.
    pub features: Option<Features>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            planner: PlannerMode::default(),
            strategy: None,
            cache_budget: DEFAULT_CACHE_BUDGET,
            features: None,
        }
    }
}

impl PlanOptions {
    pub fn with_planner(mut self, planner: PlannerMode) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_strategy(mut self, strategy: Family) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_cache_budget(mut self, cache_budget: usize) -> Self {
        self.cache_budget = cache_budget;
        self
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = Some(features);
        self
    }

    /// The capabilities plans are built for.
    pub fn features(&self) -> Features {
        self.features.unwrap_or_else(Features::detect)
    }
}

/// Builds plans from a registry, consulting and updating a wisdom cache.
#[derive(Debug)]
pub struct Planner<T> {
    registry: Arc<Registry<T>>,
    wisdom: Arc<Wisdom>,
    options: PlanOptions,
}

impl<T: Float> Planner<T> {
    /// Creates a planner over the default registry and the global wisdom cache.
    pub fn new(options: PlanOptions) -> Self {
        Self::with_registry(T::default_registry(), global_wisdom(), options)
    }

    pub fn with_registry(
        registry: Arc<Registry<T>>,
        wisdom: Arc<Wisdom>,
        options: PlanOptions,
    ) -> Self {
        Self {
            registry,
            wisdom,
            options,
        }
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    pub fn registry(&self) -> &Arc<Registry<T>> {
        &self.registry
    }

    pub fn wisdom(&self) -> &Arc<Wisdom> {
        &self.wisdom
    }

    /// Builds a plan for transforms of `size` points.
    ///
    /// The algorithm is, in order of preference: the family forced by the options, the family
    /// recorded in wisdom, the fastest measured family (which is then recorded), or the
    /// highest priority codelet.
    pub fn plan(&self, size: usize) -> Result<Plan<T>, Error> {
        if size == 0 {
            return Err(Error::InvalidLength(size));
        }
        let features = self.options.features();
        let dispatcher = Dispatcher::new(&self.registry, features, self.options.cache_budget);

        let kernel = if let Some(family) = self.options.strategy {
            Kernel::bind(&dispatcher.resolve(size, Some(family))?)
        } else if let Some(kernel) = self.from_wisdom(&dispatcher, size) {
            kernel
        } else if let Some(benchmark) = self.options.planner.benchmark() {
            self.measure(&dispatcher, size, benchmark)?
        } else {
            Kernel::bind(&dispatcher.resolve(size, None)?)
        };

        Ok(Plan::from_kernel(Arc::new(kernel), self.options))
    }

    fn from_wisdom(&self, dispatcher: &Dispatcher<T>, size: usize) -> Option<Kernel<T>> {
        let algorithm =
            self.wisdom
                .lookup_algorithm(size, T::PRECISION, &dispatcher.features())?;
        let family = match Family::from_name(&algorithm) {
            Some(family) => family,
            None => {
                tracing::warn!(size, %algorithm, "ignoring unknown algorithm in wisdom");
                return None;
            }
        };
        match dispatcher.resolve(size, Some(family)) {
            Ok(resolved) => {
                tracing::debug!(size, %family, "using wisdom");
                Some(Kernel::bind(&resolved))
            }
            Err(error) => {
                tracing::warn!(size, %family, %error, "ignoring unavailable algorithm in wisdom");
                None
            }
        }
    }

    fn measure(
        &self,
        dispatcher: &Dispatcher<T>,
        size: usize,
        benchmark: Benchmark,
    ) -> Result<Kernel<T>, Error> {
        let mode = self.options.planner;
        let mut kernels = Family::ALL
            .iter()
            .copied()
            .filter(|family| mode.considers(*family))
            .filter_map(|family| {
                let resolved = dispatcher.resolve(size, Some(family)).ok()?;
                Some((family, Kernel::bind(&resolved)))
            })
            .collect::<Vec<_>>();
        if kernels.is_empty() {
            return Ok(Kernel::bind(&dispatcher.resolve(size, None)?));
        }

        let input = vec![Complex::new(T::one(), T::zero()); size];
        let winner = benchmark.fastest(kernels.iter().enumerate().map(|(index, (_, kernel))| {
            let input = &input;
            let mut output = vec![Complex::default(); size];
            let mut scratch = vec![Complex::default(); kernel.scratch_len()];
            (index, move || kernel.execute(&mut output, input, &mut scratch, true))
        }));
        let (index, elapsed) = match winner {
            Some(winner) => winner,
            None => return Ok(Kernel::bind(&dispatcher.resolve(size, None)?)),
        };
        let (family, kernel) = kernels.swap_remove(index);

        tracing::info!(size, %family, ?elapsed, "measured fastest algorithm");
        let key = WisdomKey::new(size, T::PRECISION, dispatcher.features().fingerprint());
        self.wisdom.store(WisdomEntry::now(key, family.name()));
        Ok(kernel)
    }
}

/// A ready-to-execute transform of a fixed size.
///
/// Twiddle factors and codelet chains are shared between clones.  Each clone owns its scratch
/// buffer, so a plan can be sent to another thread but not shared; clone it for each thread.
pub struct Plan<T> {
    kernel: Arc<Kernel<T>>,
    work: RefCell<Box<[Complex<T>]>>,
    options: PlanOptions,
}

impl<T: Float> Plan<T> {
    /// Plans with the default options.
    pub fn new(size: usize) -> Result<Self, Error> {
        Self::with_options(size, PlanOptions::default())
    }

    pub fn with_options(size: usize, options: PlanOptions) -> Result<Self, Error> {
        Planner::new(options).plan(size)
    }

    fn from_kernel(kernel: Arc<Kernel<T>>, options: PlanOptions) -> Self {
        // staging area for in-place transforms, then kernel scratch
        let work = vec![Complex::default(); kernel.size() + kernel.scratch_len()];
        Self {
            kernel,
            work: RefCell::new(work.into_boxed_slice()),
            options,
        }
    }

    /// The transform size.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.kernel.size()
    }

    /// The family of the primary kernel.
    pub fn algorithm(&self) -> Family {
        self.kernel.family()
    }

    /// Diagnostic name of the primary kernel.
    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }

    /// The decomposition, if no single codelet computes this size.
    pub fn strategy(&self) -> Option<&DecompositionStrategy> {
        self.kernel.strategy()
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    /// Computes the forward transform of `src` into `dst`.
    pub fn forward(&self, dst: &mut [Complex<T>], src: &[Complex<T>]) -> Result<(), Error> {
        self.out_of_place(dst, src, Transform::Fft)
    }

    /// Computes the inverse transform of `src` into `dst`, scaled by `1 / len`.
    pub fn inverse(&self, dst: &mut [Complex<T>], src: &[Complex<T>]) -> Result<(), Error> {
        self.out_of_place(dst, src, Transform::Ifft)
    }

    pub fn forward_in_place(&self, data: &mut [Complex<T>]) -> Result<(), Error> {
        self.in_place(data, Transform::Fft)
    }

    /// Computes the inverse transform of `data` in place, scaled by `1 / len`.
    pub fn inverse_in_place(&self, data: &mut [Complex<T>]) -> Result<(), Error> {
        self.in_place(data, Transform::Ifft)
    }

    fn out_of_place(
        &self,
        dst: &mut [Complex<T>],
        src: &[Complex<T>],
        transform: Transform,
    ) -> Result<(), Error> {
        check_len("source", src.len(), self.len())?;
        check_len("destination", dst.len(), self.len())?;
        let mut work = self.work.borrow_mut();
        let scratch = &mut work[self.len()..];
        self.kernel
            .execute(dst, src, scratch, transform.is_forward());
        self.scale(dst, transform);
        Ok(())
    }

    fn in_place(&self, data: &mut [Complex<T>], transform: Transform) -> Result<(), Error> {
        check_len("data", data.len(), self.len())?;
        let mut work = self.work.borrow_mut();
        let (staging, scratch) = work.split_at_mut(self.len());
        staging.copy_from_slice(data);
        self.kernel
            .execute(data, staging, scratch, transform.is_forward());
        self.scale(data, transform);
        Ok(())
    }

    fn scale(&self, data: &mut [Complex<T>], transform: Transform) {
        if let Some(scale) = transform.scale::<T>(self.len()) {
            for x in data {
                *x = x.scale(scale);
            }
        }
    }
}

impl<T: Float> Clone for Plan<T> {
    fn clone(&self) -> Self {
        Self::from_kernel(self.kernel.clone(), self.options)
    }
}

impl<T: Float> std::fmt::Debug for Plan<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Plan")
            .field("size", &self.kernel.size())
            .field("algorithm", &self.kernel.family())
            .field("kernel", &self.kernel.name())
            .finish()
    }
}

impl<T: Float> Fft for Plan<T> {
    type Real = T;

    fn size(&self) -> usize {
        self.len()
    }

    fn transform_in_place(
        &self,
        input: &mut [Complex<T>],
        transform: Transform,
    ) -> Result<(), Error> {
        self.in_place(input, transform)
    }

    fn transform(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
        transform: Transform,
    ) -> Result<(), Error> {
        self.out_of_place(output, input, transform)
    }
}
