use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Shl, Shr, Sub, SubAssign};

pub const FRACBITS: i32 = 16;
pub const FRACUNIT: i32 = 1 << FRACBITS;

/// 16.16 two's-complement fixed point.
///
/// All multiplies and divides go through `i64` intermediates and saturate on
/// overflow. Conversion to an integer pixel coordinate is always the
/// arithmetic right shift (`to_int`/`floor`), which rounds toward negative
/// infinity; this is the single rounding rule used throughout the renderer so
/// pixel placement is bit-identical on every platform.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const UNIT: Fixed = Fixed(FRACUNIT);
    pub const MAX: Fixed = Fixed(i32::MAX);
    pub const MIN: Fixed = Fixed(i32::MIN);

    /// Reinterpret raw 16.16 bits.
    #[inline]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn from_int(v: i32) -> Self {
        Self(v << FRACBITS)
    }

    /// Arithmetic shift down to an integer (floor).
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRACBITS
    }

    /// Smallest integer not below `self`.
    #[inline]
    pub const fn ceil_int(self) -> i32 {
        (self.0 + (FRACUNIT - 1)) >> FRACBITS
    }

    /// Fractional part in [0, FRACUNIT).
    #[inline]
    pub const fn frac(self) -> i32 {
        self.0 & (FRACUNIT - 1)
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.wrapping_abs())
    }

    #[inline]
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self(self.0.clamp(min.0, max.0))
    }

    /// Only used when generating tables and demo assets, never on the render
    /// path.
    #[inline]
    pub fn from_float(v: f64) -> Self {
        Self((v * FRACUNIT as f64) as i32)
    }

    #[inline]
    pub fn to_float(self) -> f32 {
        self.0 as f32 / FRACUNIT as f32
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_float())
    }
}

impl From<i32> for Fixed {
    fn from(v: i32) -> Self {
        Self::from_int(v)
    }
}

impl Add for Fixed {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Fixed {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Mul for Fixed {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let r = ((self.0 as i64) * (rhs.0 as i64)) >> FRACBITS;
        if r > i32::MAX as i64 {
            Self(i32::MAX)
        } else if r < i32::MIN as i64 {
            Self(i32::MIN)
        } else {
            Self(r as i32)
        }
    }
}

impl MulAssign for Fixed {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<i32> for Fixed {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Div for Fixed {
    type Output = Self;

    /// Saturates toward the sign of the numerator when the divisor is zero or
    /// the quotient overflows.
    #[inline]
    fn div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return Self(if self.0 < 0 { i32::MIN } else { i32::MAX });
        }
        let r = ((self.0 as i64) << FRACBITS) / rhs.0 as i64;
        if r > i32::MAX as i64 {
            Self(i32::MAX)
        } else if r < i32::MIN as i64 {
            Self(i32::MIN)
        } else {
            Self(r as i32)
        }
    }
}

impl DivAssign for Fixed {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Neg for Fixed {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

impl Shl<i32> for Fixed {
    type Output = Self;
    #[inline]
    fn shl(self, rhs: i32) -> Self {
        Self(self.0 << rhs)
    }
}

impl Shr<i32> for Fixed {
    type Output = Self;
    #[inline]
    fn shr(self, rhs: i32) -> Self {
        Self(self.0 >> rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_identities() {
        let two = Fixed::from_int(2);
        assert_eq!(two * Fixed::UNIT, two);
        assert_eq!(two * Fixed::from_int(3), Fixed::from_int(6));
        assert_eq!(-two * Fixed::from_int(3), Fixed::from_int(-6));
    }

    #[test]
    fn div_identities() {
        let six = Fixed::from_int(6);
        assert_eq!(six / Fixed::from_int(3), Fixed::from_int(2));
        assert_eq!(six / Fixed::UNIT, six);
        // half
        assert_eq!(
            Fixed::from_int(1) / Fixed::from_int(2),
            Fixed::from_bits(FRACUNIT / 2)
        );
    }

    #[test]
    fn div_by_zero_saturates() {
        assert_eq!(Fixed::from_int(5) / Fixed::ZERO, Fixed::MAX);
        assert_eq!(Fixed::from_int(-5) / Fixed::ZERO, Fixed::MIN);
    }

    #[test]
    fn floor_is_arithmetic_shift() {
        assert_eq!(Fixed::from_bits(3 * FRACUNIT / 2).to_int(), 1);
        assert_eq!(Fixed::from_bits(-3 * FRACUNIT / 2).to_int(), -2);
        assert_eq!(Fixed::from_bits(3 * FRACUNIT / 2).ceil_int(), 2);
    }

    #[test]
    fn saturating_extremes() {
        assert_eq!(Fixed::MAX + Fixed::UNIT, Fixed::MAX);
        assert_eq!(Fixed::MIN - Fixed::UNIT, Fixed::MIN);
        assert_eq!(Fixed::MAX * Fixed::from_int(2), Fixed::MAX);
    }
}
