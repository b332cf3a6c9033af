use core::fmt::Debug;
use num_traits::{Float as NumFloat, FloatConst, FromPrimitive, NumAssign};

/// Floating-point types used for performing fast Fourier transforms.
pub trait Float:
    NumFloat + FloatConst + FromPrimitive + NumAssign + Default + Debug + Send + Sync + 'static
{
}

impl<T> Float for T where
    T: NumFloat + FloatConst + FromPrimitive + NumAssign + Default + Debug + Send + Sync + 'static
{
}

/// Converts an `f64` constant into the transform's float type.
#[inline]
pub(crate) fn cast<T: Float>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}
