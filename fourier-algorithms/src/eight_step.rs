//! Eight-step FFT for large power-of-two sizes.
//!
//! The same factorization as the six-step algorithm, with the row count rounded up, tiled
//! transposes, and the twiddle multiply fused into the middle transpose.

use crate::autosort;
use crate::float::Float;
use crate::transpose::{transpose_blocked, BLOCK};
use num_complex::Complex;

/// Splits a power-of-two size into `(n1, n2)` with `n1 >= n2`.
pub fn split(size: usize) -> Option<(usize, usize)> {
    if size < 4 || !size.is_power_of_two() {
        return None;
    }
    let n1 = 1 << ((size.trailing_zeros() + 1) / 2);
    Some((n1, size / n1))
}

/// Transposes `src` (`rows` x `cols`) into `dst`, multiplying element `(r, c)` by `w^(r*c)`.
fn twiddle_transpose<T: Float>(
    src: &[Complex<T>],
    dst: &mut [Complex<T>],
    rows: usize,
    cols: usize,
    twiddles: &[Complex<T>],
) {
    for row_block in (0..rows).step_by(BLOCK) {
        for col_block in (0..cols).step_by(BLOCK) {
            for row in row_block..rows.min(row_block + BLOCK) {
                for col in col_block..cols.min(col_block + BLOCK) {
                    dst[col * rows + row] = src[row * cols + col] * twiddles[row * col];
                }
            }
        }
    }
}

/// Eight-step codelet.
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

    transpose_blocked(src, scratch, n2, n1);
    for row in scratch.chunks_exact_mut(n2) {
        let applied = autosort::apply(row, &mut dst[..n2], twiddles, n1);
        debug_assert!(applied);
    }

    twiddle_transpose(scratch, dst, n1, n2, twiddles);
    for row in dst.chunks_exact_mut(n1) {
        let applied = autosort::apply(row, &mut scratch[..n1], twiddles, n2);
        debug_assert!(applied);
    }

    transpose_blocked(dst, scratch, n2, n1);
    dst.copy_from_slice(scratch);
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::{assert_close, random, reference};
    use crate::twiddle::roots;

    #[test]
    fn splits() {
        assert_eq!(split(8), Some((4, 2)));
        assert_eq!(split(4096), Some((64, 64)));
        assert_eq!(split(8192), Some((128, 64)));
        assert_eq!(split(3), None);
    }

    #[test]
    fn matches_reference() {
        for shift in 2..=11 {
            let size = 1 << shift;
            for &forward in &[true, false] {
                let input = random(size);
                let mut output = vec![Complex::default(); size];
                let mut scratch = vec![Complex::default(); size];
                assert!(codelet(
                    &mut output,
                    &input,
                    &roots(size, forward),
                    &mut scratch,
                    None
                ));
                assert_close(&output, &reference(&input, forward));
            }
        }
    }

    #[test]
    fn rows_run_in_oversized_scratch() {
        let size = 2048;
        let input = random(size);
        let mut output = vec![Complex::default(); size];
        let mut scratch = vec![Complex::default(); 2 * size];
        assert!(codelet(
            &mut output,
            &input,
            &roots(size, true),
            &mut scratch,
            None
        ));
        assert_close(&output, &reference(&input, true));
    }
}
