//! Implementation of a mixed-radix Stockham autosort FFT.
//!
//! Each pass reads from one buffer and writes to the other, so the output lands in natural
//! order without a permutation.  Supported sizes are products of 2, 3 and 5.

pub mod butterfly;

use crate::autosort::butterfly::{butterfly, MAX_RADIX};
use crate::float::Float;
use num_complex::Complex;

const RADICES: [usize; 5] = [8, 4, 5, 3, 2];

/// Returns true if the size factors entirely into the supported radices.
pub fn is_supported(size: usize) -> bool {
    if size == 0 {
        return false;
    }
    let mut size = size;
    for &factor in &[2, 3, 5] {
        while size % factor == 0 {
            size /= factor;
        }
    }
    size == 1
}

/// Chooses the radix of the next pass.
///
/// The first pass is radix 4 when possible (helps performance), then the largest radix first.
#[inline]
fn next_radix(size: usize, first: bool) -> usize {
    if first && size % 4 == 0 {
        return 4;
    }
    RADICES
        .iter()
        .copied()
        .find(|radix| size % radix == 0)
        .unwrap_or(size)
}

/// Determines the radix of every pass for a particular size.
pub fn radices(size: usize) -> Option<impl Iterator<Item = usize>> {
    if !is_supported(size) {
        return None;
    }
    let mut remaining = size;
    let mut first = true;
    Some(core::iter::from_fn(move || {
        if remaining == 1 {
            return None;
        }
        let radix = next_radix(remaining, first);
        first = false;
        remaining /= radix;
        Some(radix)
    }))
}

/// A single autosort pass.
///
/// `twiddles[e * twiddle_stride]` must be `w^e` for the full transform length `input.len()`.
#[inline(always)]
fn pass<T: Float>(
    input: &[Complex<T>],
    output: &mut [Complex<T>],
    size: usize,
    stride: usize,
    radix: usize,
    twiddles: &[Complex<T>],
    twiddle_stride: usize,
) {
    let n = input.len();
    let m = size / radix;
    let step = (n / size) * twiddle_stride;

    let mut roots = [Complex::<T>::default(); MAX_RADIX];
    for (k, root) in roots.iter_mut().enumerate().take(radix) {
        *root = twiddles[k * (n / radix) * twiddle_stride];
    }

    let mut x = [Complex::<T>::default(); MAX_RADIX];
    let mut y = [Complex::<T>::default(); MAX_RADIX];
    for p in 0..m {
        for q in 0..stride {
            for k in 0..radix {
                x[k] = input[q + stride * (p + k * m)];
            }
            butterfly(&x[..radix], &mut y[..radix], &roots[..radix]);
            let base = q + stride * p * radix;
            if p == 0 {
                for j in 0..radix {
                    output[base + stride * j] = y[j];
                }
            } else {
                for j in 0..radix {
                    output[base + stride * j] = y[j] * twiddles[p * j * step];
                }
            }
        }
    }
}

/// Applies an autosort transform to `data` using `work` as the ping-pong buffer.
///
/// Returns false, leaving `data` untouched, if the size is unsupported or `work` is too small.
#[inline]
pub fn apply<T: Float>(
    data: &mut [Complex<T>],
    work: &mut [Complex<T>],
    twiddles: &[Complex<T>],
    twiddle_stride: usize,
) -> bool {
    let n = data.len();
    let radices = match radices(n) {
        Some(radices) => radices,
        None => return false,
    };
    if work.len() < n || twiddles.len() < (n - 1) * twiddle_stride + 1 {
        return false;
    }
    let work = &mut work[..n];

    // Apply passes with data ping-ponging between work and data buffer
    let mut data_in_work = false;
    let mut size = n;
    let mut stride = 1;
    for radix in radices {
        if data_in_work {
            pass(work, data, size, stride, radix, twiddles, twiddle_stride);
        } else {
            pass(data, work, size, stride, radix, twiddles, twiddle_stride);
        }
        data_in_work = !data_in_work;
        size /= radix;
        stride *= radix;
    }
    if data_in_work {
        data.copy_from_slice(work);
    }
    true
}

/// Stockham codelet.
pub fn codelet<T: Float>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    scratch: &mut [Complex<T>],
    _permutation: Option<&[usize]>,
) -> bool {
    let n = src.len();
    if dst.len() != n || twiddles.len() < n || scratch.len() < n || !is_supported(n) {
        return false;
    }
    dst.copy_from_slice(src);
    apply(dst, scratch, twiddles, 1)
}

/// Alignment the wide codelet requires of its buffers.
pub const WIDE_ALIGNMENT: usize = 32;

fn is_aligned<T>(buffer: &[T]) -> bool {
    buffer.as_ptr() as usize % WIDE_ALIGNMENT == 0
}

#[multiversion::multiversion]
#[clone(target = "[x86|x86_64]+avx2")]
fn wide<T: Float>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    scratch: &mut [Complex<T>],
) -> bool {
    codelet(dst, src, twiddles, scratch, None)
}

/// Stockham codelet compiled for wide vector units.
///
/// Declines buffers that are not aligned to [`WIDE_ALIGNMENT`].
///
/// [`WIDE_ALIGNMENT`]: constant.WIDE_ALIGNMENT.html
pub fn wide_codelet<T: Float>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    twiddles: &[Complex<T>],
    scratch: &mut [Complex<T>],
    _permutation: Option<&[usize]>,
) -> bool {
    if !(is_aligned(dst) && is_aligned(src) && is_aligned(scratch)) {
        return false;
    }
    wide(dst, src, twiddles, scratch)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::{assert_close, random, reference};
    use crate::twiddle::roots;

    #[test]
    fn radices_multiply_to_size() {
        for size in &[2usize, 4, 6, 12, 40, 60, 64, 360, 1000] {
            let product: usize = radices(*size).unwrap().product();
            assert_eq!(product, *size);
        }
        assert_eq!(radices(16).unwrap().collect::<Vec<_>>(), vec![4, 4]);
        assert_eq!(radices(64).unwrap().collect::<Vec<_>>(), vec![4, 8, 2]);
        assert!(radices(7).is_none());
        assert!(radices(0).is_none());
    }

    #[test]
    fn matches_reference() {
        for &size in &[2usize, 3, 4, 5, 6, 8, 10, 12, 15, 16, 40, 64, 90, 128, 243, 250] {
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
    fn declines_unsupported() {
        let input = random(7);
        let mut output = vec![Complex::default(); 7];
        let mut scratch = vec![Complex::default(); 7];
        assert!(!codelet(&mut output, &input, &roots(7, true), &mut scratch, None));
        assert!(output.iter().all(|x| *x == Complex::default()));

        let input = random(8);
        let mut output = vec![Complex::default(); 8];
        let mut scratch = vec![Complex::default(); 4];
        assert!(!codelet(&mut output, &input, &roots(8, true), &mut scratch, None));
    }

    #[test]
    fn strided_twiddles() {
        // A size 8 transform using every other root of a size 16 table
        let input = random(8);
        let mut data = input.clone();
        let mut work = vec![Complex::default(); 8];
        assert!(apply(&mut data, &mut work, &roots(16, true), 2));
        assert_close(&data, &reference(&input, true));
    }
}
