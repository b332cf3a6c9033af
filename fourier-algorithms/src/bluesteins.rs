//! Chirp and filter generation for Bluestein's algorithm.
//!
//! A size `n` transform is rewritten as a linear convolution with the chirp
//! `c[j] = exp(-πi j² / n)`, which a padded transform of at least `2n - 1` points computes
//! circularly.

use crate::twiddle::compute_half_twiddle;
use crate::Float;
use alloc::vec;
use alloc::vec::Vec;
use num_complex::Complex;

/// The smallest padded length that keeps the circular convolution linear.
pub fn min_inner_size(size: usize) -> usize {
    2 * size - 1
}

/// Generates the chirp `c[j] = exp(∓πi j² / size)`.
pub fn chirp<T: Float>(size: usize, forward: bool) -> Vec<Complex<T>> {
    let modulus = 2 * size as u128;
    (0..size)
        .map(|j| {
            let square = (j as u128 * j as u128) % modulus;
            compute_half_twiddle(square as usize, size, forward)
        })
        .collect()
}

/// Generates the convolution kernel `conj(c[t])` for `t` in `-(size-1)..size`, wrapped
/// into a buffer of `inner_size` points.
///
/// The caller transforms this buffer once to obtain the frequency-domain filter.  `inner_size`
/// must be at least [`min_inner_size`]`(size)`.
///
/// [`min_inner_size`]: fn.min_inner_size.html
pub fn filter<T: Float>(size: usize, inner_size: usize, forward: bool) -> Vec<Complex<T>> {
    debug_assert!(inner_size >= min_inner_size(size));
    let mut kernel = vec![Complex::default(); inner_size];
    for (t, c) in chirp::<T>(size, forward).into_iter().enumerate() {
        kernel[t] = c.conj();
        if t > 0 {
            kernel[inner_size - t] = c.conj();
        }
    }
    kernel
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::{assert_close, random, reference};
    use crate::autosort::butterfly::dft;
    use crate::twiddle::roots;

    fn transform(input: &[Complex<f64>], forward: bool) -> Vec<Complex<f64>> {
        let mut output = vec![Complex::default(); input.len()];
        dft(input, &mut output, &roots(input.len(), forward));
        output
    }

    #[test]
    fn convolution_matches_reference() {
        for &(size, inner) in &[(1usize, 1usize), (2, 3), (5, 9), (7, 16), (13, 32), (17, 40)] {
            for &forward in &[true, false] {
                let input = random(size);
                let chirp = chirp::<f64>(size, forward);
                let response = transform(&filter::<f64>(size, inner, forward), true);

                let mut padded = vec![Complex::default(); inner];
                for (p, (x, c)) in padded.iter_mut().zip(input.iter().zip(&chirp)) {
                    *p = x * c;
                }
                let spectrum = transform(&padded, true)
                    .into_iter()
                    .zip(&response)
                    .map(|(x, h)| x * h)
                    .collect::<Vec<_>>();
                let convolved = transform(&spectrum, false);
                let output = convolved
                    .iter()
                    .zip(&chirp)
                    .map(|(x, c)| x * c / inner as f64)
                    .collect::<Vec<_>>();
                assert_close(&output, &reference(&input, forward));
            }
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn filter_rejects_short_buffer() {
        filter::<f64>(8, 14, true);
    }
}
