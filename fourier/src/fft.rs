use crate::error::Error;
use num_complex::Complex;
use num_traits::Float;

/// Specifies a type of transform to perform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transform {
    /// Fast Fourier transform
    Fft,
    /// Inverse fast Fourier transform
    Ifft,
    /// Unscaled IFFT (conventionally the IFFT is scaled by `1 / N`)
    UnscaledIfft,
    /// Square-root scaled FFT (a unitary transform)
    SqrtScaledFft,
    /// Square-root scaled IFFT (a unitary transform)
    SqrtScaledIfft,
}

impl Transform {
    /// Returns true if the transform is a forward transform.
    #[inline]
    pub fn is_forward(&self) -> bool {
        match self {
            Self::Fft | Self::SqrtScaledFft => true,
            Self::Ifft | Self::UnscaledIfft | Self::SqrtScaledIfft => false,
        }
    }

    /// Returns the inverse transform, or `None` for `UnscaledIfft`.
    #[inline]
    pub fn inverse(&self) -> Option<Self> {
        match self {
            Self::Fft => Some(Self::Ifft),
            Self::Ifft => Some(Self::Fft),
            Self::SqrtScaledFft => Some(Self::SqrtScaledIfft),
            Self::SqrtScaledIfft => Some(Self::SqrtScaledFft),
            Self::UnscaledIfft => None,
        }
    }

    /// The factor applied to the output of a size `size` transform, or `None` if unscaled.
    #[inline]
    pub fn scale<T: Float>(&self, size: usize) -> Option<T> {
        let size = T::from(size)?;
        match self {
            Self::Fft | Self::UnscaledIfft => None,
            Self::Ifft => Some(T::one() / size),
            Self::SqrtScaledFft | Self::SqrtScaledIfft => Some(T::one() / size.sqrt()),
        }
    }
}

/// Checks that a caller-supplied buffer holds exactly `expected` elements.
pub(crate) fn check_len(which: &'static str, actual: usize, expected: usize) -> Result<(), Error> {
    if actual == 0 {
        Err(Error::NilBuffer { which })
    } else if actual != expected {
        Err(Error::LengthMismatch {
            which,
            expected,
            actual,
        })
    } else {
        Ok(())
    }
}

/// The interface for performing FFTs.
pub trait Fft: core::fmt::Debug {
    /// The real type used by the FFT.
    type Real: Copy;

    /// The size of the FFT.
    fn size(&self) -> usize;

    /// Apply an FFT or IFFT in-place.
    fn transform_in_place(
        &self,
        input: &mut [Complex<Self::Real>],
        transform: Transform,
    ) -> Result<(), Error>;

    /// Apply an FFT or IFFT out-of-place.
    fn transform(
        &self,
        input: &[Complex<Self::Real>],
        output: &mut [Complex<Self::Real>],
        transform: Transform,
    ) -> Result<(), Error> {
        check_len("input", input.len(), self.size())?;
        check_len("output", output.len(), self.size())?;
        output.copy_from_slice(input);
        self.transform_in_place(output, transform)
    }

    /// Apply an FFT in-place.
    fn fft_in_place(&self, input: &mut [Complex<Self::Real>]) -> Result<(), Error> {
        self.transform_in_place(input, Transform::Fft)
    }

    /// Apply an IFFT in-place.
    fn ifft_in_place(&self, input: &mut [Complex<Self::Real>]) -> Result<(), Error> {
        self.transform_in_place(input, Transform::Ifft)
    }

    /// Apply an FFT out-of-place.
    fn fft(
        &self,
        input: &[Complex<Self::Real>],
        output: &mut [Complex<Self::Real>],
    ) -> Result<(), Error> {
        self.transform(input, output, Transform::Fft)
    }

    /// Apply an IFFT out-of-place.
    fn ifft(
        &self,
        input: &[Complex<Self::Real>],
        output: &mut [Complex<Self::Real>],
    ) -> Result<(), Error> {
        self.transform(input, output, Transform::Ifft)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inverse_pairs() {
        for transform in &[
            Transform::Fft,
            Transform::Ifft,
            Transform::SqrtScaledFft,
            Transform::SqrtScaledIfft,
        ] {
            let inverse = transform.inverse().unwrap();
            assert_ne!(transform.is_forward(), inverse.is_forward());
            assert_eq!(inverse.inverse(), Some(*transform));
        }
        assert_eq!(Transform::UnscaledIfft.inverse(), None);
    }

    #[test]
    fn scales() {
        assert_eq!(Transform::Fft.scale::<f64>(16), None);
        assert_eq!(Transform::UnscaledIfft.scale::<f64>(16), None);
        assert_eq!(Transform::Ifft.scale::<f64>(16), Some(0.0625));
        assert_eq!(Transform::SqrtScaledFft.scale::<f64>(16), Some(0.25));
        assert_eq!(Transform::SqrtScaledIfft.scale::<f32>(16), Some(0.25));
    }

    #[test]
    fn buffer_checks() {
        assert!(check_len("input", 8, 8).is_ok());
        assert!(matches!(
            check_len("input", 0, 8),
            Err(Error::NilBuffer { which: "input" })
        ));
        assert!(matches!(
            check_len("output", 4, 8),
            Err(Error::LengthMismatch {
                which: "output",
                expected: 8,
                actual: 4
            })
        ));
    }
}
