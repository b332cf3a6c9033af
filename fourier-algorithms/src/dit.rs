//! Radix-2 decimation-in-time FFT.
//!
//! The input is gathered through a bit-reversal permutation, then combined in place with
//! butterflies of doubling span.

use crate::float::Float;
use alloc::vec::Vec;
use num_complex::Complex;

/// Generates the bit-reversal permutation for a power-of-two size.
///
/// Other sizes have no bit-reversed order and map to the natural order.
pub fn bit_reversal(size: usize) -> Vec<usize> {
    if size < 2 || !size.is_power_of_two() {
        return (0..size).collect();
    }
    let shift = (core::mem::size_of::<usize>() * 8) as u32 - size.trailing_zeros();
    (0..size).map(|index| index.reverse_bits() >> shift).collect()
}

/// Radix-2 DIT codelet.
///
/// Declines sizes that aren't powers of two and calls without a bit-reversal permutation.
pub fn codelet<T: Float>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    _scratch: &mut [Complex<T>],
    permutation: Option<&[usize]>,
) -> bool {
    let n = src.len();
    let permutation = match permutation {
        Some(permutation) if permutation.len() == n => permutation,
        _ => return false,
    };
    if !n.is_power_of_two() || dst.len() != n || twiddles.len() < n {
        return false;
    }

    for (out, &index) in dst.iter_mut().zip(permutation) {
        *out = src[index];
    }

    let mut span = 2;
    while span <= n {
        let half = span / 2;
        let step = n / span;
        for block in dst.chunks_exact_mut(span) {
            let (lo, hi) = block.split_at_mut(half);
            for (j, (a, b)) in lo.iter_mut().zip(hi.iter_mut()).enumerate() {
                let t = *b * twiddles[j * step];
                *b = *a - t;
                *a += t;
            }
        }
        span *= 2;
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::{assert_close, random, reference};
    use crate::twiddle::roots;

    #[test]
    fn bit_reversal_order() {
        assert_eq!(bit_reversal(1), vec![0]);
        assert_eq!(bit_reversal(2), vec![0, 1]);
        assert_eq!(bit_reversal(8), vec![0, 4, 2, 6, 1, 5, 3, 7]);
        assert_eq!(bit_reversal(6), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn matches_reference() {
        for shift in 0..=10 {
            let size = 1 << shift;
            for &forward in &[true, false] {
                let input = random(size);
                let mut output = vec![Complex::default(); size];
                assert!(codelet(
                    &mut output,
                    &input,
                    &roots(size, forward),
                    &mut [],
                    Some(bit_reversal(size).as_slice()),
                ));
                assert_close(&output, &reference(&input, forward));
            }
        }
    }

    #[test]
    fn declines_without_permutation() {
        let input = random(16);
        let mut output = vec![Complex::default(); 16];
        assert!(!codelet(&mut output, &input, &roots(16, true), &mut [], None));
        assert!(!codelet(
            &mut output,
            &input,
            &roots(16, true),
            &mut [],
            Some(bit_reversal(8).as_slice())
        ));
        assert!(output.iter().all(|x| *x == Complex::default()));
    }
}
