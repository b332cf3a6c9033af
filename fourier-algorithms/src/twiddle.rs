use crate::float::{cast, Float};
use alloc::vec::Vec;
use num_complex::Complex;

#[cfg(not(feature = "std"))]
use num_traits::Float as _; // enable sin, cos without std

/// Computes `exp(-2πi * index / size)`, conjugated for inverse transforms.
pub fn compute_twiddle<T: Float>(index: usize, size: usize, forward: bool) -> Complex<T> {
    let index = index % size;
    let theta = (index * 2) as f64 * core::f64::consts::PI / size as f64;
    let twiddle = Complex::new(cast(theta.cos()), cast(-theta.sin()));
    if forward {
        twiddle
    } else {
        twiddle.conj()
    }
}

/// Computes `exp(-πi * index / size)`, conjugated for inverse transforms.
///
/// The index is reduced modulo `2 * size`, so squared indices stay exact.
pub fn compute_half_twiddle<T: Float>(index: usize, size: usize, forward: bool) -> Complex<T> {
    let index = index % (2 * size);
    let theta = index as f64 * core::f64::consts::PI / size as f64;
    let twiddle = Complex::new(cast(theta.cos()), cast(-theta.sin()));
    if forward {
        twiddle
    } else {
        twiddle.conj()
    }
}

/// The full table of roots of unity for a transform of `size`, where `table[k] = w^k`.
///
/// Every codelet reads its phase factors from a table in this layout, so the table alone
/// determines the transform direction.
pub fn roots<T: Float>(size: usize, forward: bool) -> Vec<Complex<T>> {
    (0..size)
        .map(|index| compute_twiddle(index, size, forward))
        .collect()
}
