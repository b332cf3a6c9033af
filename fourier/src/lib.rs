//! This crate provides fast Fourier transforms (FFT) in pure Rust.
//!
//! # Planning
//! A [`Plan`] is built once per transform size and reused.  Planning picks, in order:
//! 1. the algorithm family forced by [`PlanOptions::strategy`], if any,
//! 2. the family recorded in the [`Wisdom`] cache for this size, precision, and CPU,
//! 3. the fastest family when [`PlannerMode`] requests measurement (the winner is recorded),
//! 4. the highest priority codelet in the [`Registry`] that the CPU can run.
//!
//! Sizes without a codelet are factored into smaller transforms by the
//! [`DecompositionPlanner`], and sizes with large prime factors are computed with Bluestein's
//! algorithm.
//!
//! # Dispatch
//! Every codelet may decline an input it can't handle (for example, a misaligned buffer).  Each
//! plan holds a precomputed chain of candidates that ends with a kernel that never declines, so
//! a declined call falls through without any planning at execution time.
//!
//! # Wisdom
//! Planning decisions can be saved with [`Wisdom::export`] and restored with
//! [`Wisdom::import`].  [`global_wisdom`] is the cache used by default.
//!
//! # Environment
//! Setting `FOURIER_FORCE_GENERIC` restricts dispatch to the portable codelets.
//!
//! [`Plan`]: struct.Plan.html
//! [`PlanOptions::strategy`]: struct.PlanOptions.html#structfield.strategy
//! [`Wisdom`]: struct.Wisdom.html
//! [`PlannerMode`]: enum.PlannerMode.html
//! [`Registry`]: struct.Registry.html
//! [`DecompositionPlanner`]: struct.DecompositionPlanner.html
//! [`Wisdom::export`]: struct.Wisdom.html#method.export
//! [`Wisdom::import`]: struct.Wisdom.html#method.import
//! [`global_wisdom`]: fn.global_wisdom.html

mod benchmark;
mod codelets;
mod decompose;
mod dispatch;
mod error;
mod features;
mod fft;
mod kernel;
mod plan;
mod registry;
mod wisdom;

pub use benchmark::Benchmark;
pub use decompose::{
    plan_decomposition, DecompositionPlanner, DecompositionStrategy, Stage, DEFAULT_CACHE_BUDGET,
    DEFAULT_ELEMENT_BYTES,
};
pub use dispatch::{Dispatcher, ResolvedDecomposition, ResolvedKernel};
pub use error::Error;
pub use features::{Features, SimdLevel, FORCE_GENERIC_ENV};
pub use fft::{Fft, Transform};
pub use fourier_algorithms::{CodeletFn, PermutationFn};
pub use plan::{Plan, PlanOptions, Planner, PlannerMode};
pub use registry::{CodeletEntry, Family, Registry};
pub use wisdom::{global_wisdom, Precision, Wisdom, WisdomEntry, WisdomKey};

use std::sync::{Arc, OnceLock};

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A real scalar type that supports FFTs.
pub trait Float: fourier_algorithms::Float + sealed::Sealed {
    /// The precision of `Complex<Self>`.
    const PRECISION: Precision;

    /// The process-wide registry of default codelets.
    fn default_registry() -> Arc<Registry<Self>>;
}

impl Float for f32 {
    const PRECISION: Precision = Precision::Complex64;

    fn default_registry() -> Arc<Registry<Self>> {
        static REGISTRY: OnceLock<Arc<Registry<f32>>> = OnceLock::new();
        REGISTRY
            .get_or_init(|| Arc::new(Registry::with_default_codelets()))
            .clone()
    }
}

impl Float for f64 {
    const PRECISION: Precision = Precision::Complex128;

    fn default_registry() -> Arc<Registry<Self>> {
        static REGISTRY: OnceLock<Arc<Registry<f64>>> = OnceLock::new();
        REGISTRY
            .get_or_init(|| Arc::new(Registry::with_default_codelets()))
            .clone()
    }
}

/// Create a complex-valued FFT over `T` with the specified size.
pub fn create_fft<T: Float>(size: usize) -> Result<Box<dyn Fft<Real = T> + Send>, Error> {
    Ok(Box::new(Plan::new(size)?))
}
