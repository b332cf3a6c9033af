//! Scalar butterflies.
//!
//! Phase factors come from a root table (`roots[k] = w^k` for the butterfly's radix), so the
//! same butterfly serves forward and inverse transforms.

use crate::float::Float;
use num_complex::Complex;

/// The largest radix used by the Stockham passes.
pub const MAX_RADIX: usize = 8;

#[inline(always)]
fn butterfly2<T: Float>(input: &[Complex<T>], output: &mut [Complex<T>]) {
    output[0] = input[0] + input[1];
    output[1] = input[0] - input[1];
}

#[inline(always)]
fn butterfly4<T: Float>(input: &[Complex<T>], output: &mut [Complex<T>], quarter: Complex<T>) {
    let t0 = input[0] + input[2];
    let t1 = input[0] - input[2];
    let t2 = input[1] + input[3];
    let t3 = (input[1] - input[3]) * quarter;
    output[0] = t0 + t2;
    output[1] = t1 + t3;
    output[2] = t0 - t2;
    output[3] = t1 - t3;
}

/// Direct summation over the roots of the radix.
///
/// Valid for any radix, used for the odd radices and as the butterfly of last resort.
#[inline]
pub fn dft<T: Float>(input: &[Complex<T>], output: &mut [Complex<T>], roots: &[Complex<T>]) {
    let radix = input.len();
    for (k, out) in output.iter_mut().enumerate().take(radix) {
        let mut sum = input[0];
        let mut index = 0;
        for x in &input[1..] {
            // index = (j * k) % radix
            index += k;
            if index >= radix {
                index -= radix;
            }
            sum += *x * roots[index];
        }
        *out = sum;
    }
}

/// Applies a butterfly of radix `input.len()`.
#[inline(always)]
pub fn butterfly<T: Float>(input: &[Complex<T>], output: &mut [Complex<T>], roots: &[Complex<T>]) {
    match input.len() {
        1 => output[0] = input[0],
        2 => butterfly2(input, output),
        4 => butterfly4(input, output, roots[1]),
        _ => dft(input, output, roots),
    }
}
