//! Iteration-bounded timing used to pick between candidate kernels.

use std::time::{Duration, Instant};

/// A warm-up phase followed by a timed phase, each a fixed number of calls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Benchmark {
    pub warmup: u32,
    pub iterations: u32,
}

impl Benchmark {
    pub const MEASURE: Self = Self::new(2, 8);
    pub const PATIENT: Self = Self::new(4, 32);
    pub const EXHAUSTIVE: Self = Self::new(8, 128);

    pub const fn new(warmup: u32, iterations: u32) -> Self {
        Self { warmup, iterations }
    }

    /// The mean time of one call to `operation` after warming up.
    pub fn time_per_op<F: FnMut()>(&self, mut operation: F) -> Duration {
        for _ in 0..self.warmup {
            operation();
        }
        let iterations = self.iterations.max(1);
        let start = Instant::now();
        for _ in 0..iterations {
            operation();
        }
        start.elapsed() / iterations
    }

    /// Times every candidate and returns the fastest, keeping the earlier candidate on ties.
    pub fn fastest<K, F, I>(&self, candidates: I) -> Option<(K, Duration)>
    where
        F: FnMut(),
        I: IntoIterator<Item = (K, F)>,
    {
        let mut best: Option<(K, Duration)> = None;
        for (key, operation) in candidates {
            let elapsed = self.time_per_op(operation);
            if best.as_ref().map_or(true, |(_, fastest)| elapsed < *fastest) {
                best = Some((key, elapsed));
            }
        }
        best
    }
}
