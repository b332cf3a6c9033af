use alloc::vec::Vec;
use num_complex::Complex;

/// A fixed-size transform.
///
/// The codelet reads `src` and writes `dst`, both exactly the registered size.  The twiddle
/// table holds the roots of unity for that size (see [`roots`]) and selects the direction.
/// Returning `false` declines the input before anything is written to `dst`.
///
/// [`roots`]: fn.roots.html
pub type CodeletFn<T> = fn(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    scratch: &mut [Complex<T>],
    permutation: Option<&[usize]>,
) -> bool;

/// Generates the input permutation a codelet expects for a given size.
pub type PermutationFn = fn(size: usize) -> Vec<usize>;
