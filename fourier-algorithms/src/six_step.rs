//! Six-step FFT for large power-of-two sizes.
//!
//! A size `n = n1 * n2` transform runs as `n1` row transforms of size `n2`, a twiddle
//! multiply, and `n2` row transforms of size `n1`, with transposes in between so that every
//! row transform is contiguous.

use crate::autosort;
use crate::float::Float;
use crate::transpose::transpose;
use num_complex::Complex;

/// Splits a power-of-two size into `(n1, n2)` with `n1 <= n2`.
pub fn split(size: usize) -> Option<(usize, usize)> {
    if size < 4 || !size.is_power_of_two() {
        return None;
    }
    let n1 = 1 << (size.trailing_zeros() / 2);
    Some((n1, size / n1))
}

/// Six-step codelet.
///
/// Requires a scratch buffer of the transform size.
pub fn codelet<T: Float>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    scratch: &mut [Complex<T>],
    _permutation: Option<&[usize]>,
) -> bool {
    let n = src.len();
    let (n1, n2) = match split(n) {
        Some(split) => split,
        None => return false,
    };
    if dst.len() != n || twiddles.len() < n || scratch.len() < n {
        return false;
    }
    let scratch = &mut scratch[..n];

    // columns of the input become rows
    transpose(src, scratch, n2, n1);
    for row in scratch.chunks_exact_mut(n2) {
        let applied = autosort::apply(row, &mut dst[..n2], twiddles, n1);
        debug_assert!(applied);
    }

    for (j1, row) in scratch.chunks_exact_mut(n2).enumerate().skip(1) {
        for (k2, value) in row.iter_mut().enumerate().skip(1) {
            *value *= twiddles[j1 * k2];
        }
    }

    transpose(scratch, dst, n1, n2);
    for row in dst.chunks_exact_mut(n1) {
        let applied = autosort::apply(row, &mut scratch[..n1], twiddles, n2);
        debug_assert!(applied);
    }

    transpose(dst, scratch, n2, n1);
    dst.copy_from_slice(scratch);
    true
}
