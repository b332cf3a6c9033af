//! The stock codelet catalog.

use crate::features::SimdLevel;
use crate::registry::{CodeletEntry, Family, Registry};
use fourier_algorithms::{autosort, dit, eight_step, leaf, six_step, CodeletFn, Float};

/// Largest DIT size, as a power of two.
const DIT_MAX: u32 = 12;
/// Stockham sizes, as powers of two.
const STOCKHAM: (u32, u32) = (2, 14);
/// Wide Stockham sizes, as powers of two.
const WIDE_STOCKHAM: (u32, u32) = (4, 14);
const SIX_STEP: (u32, u32) = (10, 16);
const EIGHT_STEP: (u32, u32) = (12, 16);

impl<T: Float> Registry<T> {
    /// Creates a registry holding the stock codelets.
    pub fn with_default_codelets() -> Self {
        let mut registry = Self::new();

        registry.insert(
            CodeletEntry::new(1, Family::Recursive, leaf::identity, leaf::identity)
                .with_name("identity")
                .with_priority(100),
        );

        let leaves: [(usize, CodeletFn<T>); 5] = [
            (2, leaf::leaf2),
            (3, leaf::leaf3),
            (4, leaf::leaf4),
            (5, leaf::leaf5),
            (8, leaf::leaf8),
        ];
        for &(size, codelet) in &leaves {
            registry.insert(
                CodeletEntry::new(size, Family::Recursive, codelet, codelet)
                    .with_name("leaf")
                    .with_priority(40),
            );
        }

        for shift in 1..=DIT_MAX {
            registry.insert(
                CodeletEntry::new(1 << shift, Family::Dit, dit::codelet, dit::codelet)
                    .with_priority(10)
                    .with_permutation(dit::bit_reversal),
            );
        }

        for shift in STOCKHAM.0..=STOCKHAM.1 {
            let size = 1 << shift;
            registry.insert(
                CodeletEntry::new(size, Family::Stockham, autosort::codelet, autosort::codelet)
                    .with_priority(20)
                    .with_scratch_len(size),
            );
        }

        // only an avx2 clone of the wide codelet exists
        for shift in WIDE_STOCKHAM.0..=WIDE_STOCKHAM.1 {
            let size = 1 << shift;
            registry.insert(
                CodeletEntry::new(
                    size,
                    Family::Stockham,
                    autosort::wide_codelet,
                    autosort::wide_codelet,
                )
                .with_name("stockham/avx2")
                .with_level(SimdLevel::Avx2)
                .with_priority(30)
                .with_scratch_len(size),
            );
        }

        // transpose algorithms take over at 2^13 points
        for shift in SIX_STEP.0..=SIX_STEP.1 {
            let size = 1 << shift;
            registry.insert(
                CodeletEntry::new(size, Family::SixStep, six_step::codelet, six_step::codelet)
                    .with_priority(if shift >= 13 { 26 } else { 5 })
                    .with_scratch_len(size),
            );
        }

        for shift in EIGHT_STEP.0..=EIGHT_STEP.1 {
            let size = 1 << shift;
            registry.insert(
                CodeletEntry::new(
                    size,
                    Family::EightStep,
                    eight_step::codelet,
                    eight_step::codelet,
                )
                .with_priority(if shift >= 15 { 28 } else { 4 })
                .with_scratch_len(size),
            );
        }

        registry
    }
}
