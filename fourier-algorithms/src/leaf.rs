//! Single-butterfly codelets used as the leaves of decomposed transforms.

use crate::autosort::butterfly::butterfly;
use crate::float::Float;
use num_complex::Complex;

/// Size 1 codelet.
pub fn identity<T: Float>(
    dst: &mut [Complex<T>],
    src: &[Complex<T>],
    _twiddles: &[Complex<T>],
    _scratch: &mut [Complex<T>],
    _permutation: Option<&[usize]>,
) -> bool {
    if src.len() != 1 || dst.len() != 1 {
        return false;
    }
    dst[0] = src[0];
    true
}

macro_rules! leaf_codelets {
    { $($size:literal),* } => {
        paste::paste! {
            $(
                pub fn [<leaf $size>]<T: Float>(
                    dst: &mut [Complex<T>],
                    src: &[Complex<T>],
                    twiddles: &[Complex<T>],
                    _scratch: &mut [Complex<T>],
                    _permutation: Option<&[usize]>,
                ) -> bool {
                    if src.len() != $size || dst.len() != $size || twiddles.len() < $size {
                        return false;
                    }
                    butterfly(src, dst, &twiddles[..$size]);
                    true
                }
            )*
        }
    }
}

leaf_codelets! { 2, 3, 4, 5, 8 }

#[cfg(test)]
mod test {
    use super::*;
    use crate::codelet::CodeletFn;
    use crate::test_util::{assert_close, random, reference};
    use crate::twiddle::roots;

    #[test]
    fn matches_reference() {
        let leaves: [(usize, CodeletFn<f64>); 6] = [
            (1, identity),
            (2, leaf2),
            (3, leaf3),
            (4, leaf4),
            (5, leaf5),
            (8, leaf8),
        ];
        for &(size, leaf) in &leaves {
            for &forward in &[true, false] {
                let input = random(size);
                let mut output = vec![Complex::default(); size];
                assert!(leaf(&mut output, &input, &roots(size, forward), &mut [], None));
                assert_close(&output, &reference(&input, forward));
            }
        }
    }

    #[test]
    fn declines_wrong_size() {
        let input = random(4);
        let mut output = vec![Complex::default(); 4];
        assert!(!leaf8(&mut output, &input, &roots(4, true), &mut [], None));
        assert!(!identity(&mut output, &input, &roots(4, true), &mut [], None));
    }
}
