use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use ndarray::{LinalgScalar, ScalarOperand};
use num_traits::{Float, FromPrimitive, ToPrimitive};
pub use single_utilities::traits::FloatOpsTS;
pub use single_utilities::types::Direction;

/// Scalar bound of every numeric kernel. Implemented for `f32` and `f64`.
pub trait FloatOps:
    FloatOpsTS
    + Float
    + FromPrimitive
    + ToPrimitive
    + ScalarOperand
    + LinalgScalar
    + Debug
    + Display
    + Default
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
    + Send
    + Sync
    + 'static
{
    /// Converts an `f64` literal into `Self`, rounding to nearest.
    fn constant(value: f64) -> Self;

    fn as_f64(self) -> f64;

    fn from_count(n: usize) -> Self {
        Self::constant(n as f64)
    }
}

impl FloatOps for f32 {
    #[inline]
    fn constant(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl FloatOps for f64 {
    #[inline]
    fn constant(value: f64) -> Self {
        value
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_roundtrip() {
        assert_eq!(<f64 as FloatOps>::constant(0.25), 0.25);
        assert_eq!(<f32 as FloatOps>::constant(0.25), 0.25f32);
        assert_eq!(<f32 as FloatOps>::from_count(7), 7.0f32);
        assert_eq!(FloatOps::as_f64(2.5f32), 2.5);
    }
}
