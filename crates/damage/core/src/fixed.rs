//! Fixed-point damage amounts.
//!
//! Damage is merged additively many times over an entity's lifetime, so amounts
//! are stored as integer hundredths rather than floats. `0.1 + 0.2 == 0.3`
//! holds exactly and repeated merges never drift.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Number of decimal places carried by [`FixedPoint2`].
const DECIMAL_PLACES: u32 = 2;

/// Scale between whole units and the stored representation.
const MULTIPLIER: i32 = 10i32.pow(DECIMAL_PLACES);

/// Signed fixed-point number with two decimal places.
///
/// Internally stores `value * 100` as an `i32`. All arithmetic saturates at the
/// representable range instead of wrapping or panicking.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct FixedPoint2(i32);

impl FixedPoint2 {
    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// One whole unit.
    pub const ONE: Self = Self(MULTIPLIER);

    /// Largest representable value.
    pub const MAX: Self = Self(i32::MAX);

    /// Smallest representable value.
    pub const MIN: Self = Self(i32::MIN);

    /// Creates an amount from a whole number.
    #[inline]
    #[must_use]
    pub const fn new(whole: i32) -> Self {
        Self(whole.saturating_mul(MULTIPLIER))
    }

    /// Creates an amount from its raw hundredths representation.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw hundredths representation.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Creates an amount from a float, rounding half away from zero.
    ///
    /// NaN maps to zero and out-of-range values saturate.
    #[inline]
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Self((value * f64::from(MULTIPLIER)).round() as i32)
    }

    #[inline]
    #[must_use]
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(f64::from(value))
    }

    #[inline]
    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / f64::from(MULTIPLIER)
    }

    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Splits the amount into `parts` equal shares.
    ///
    /// The remainder of the integer division is added to the last share so the
    /// shares always sum back to `self`. Returns an empty vector for zero parts.
    #[must_use]
    pub fn split(self, parts: usize) -> Vec<Self> {
        let Ok(count) = i32::try_from(parts) else {
            return Vec::new();
        };
        if count == 0 {
            return Vec::new();
        }

        let share = self.0 / count;
        let remainder = self.0 - share * count;
        let mut shares = vec![Self(share); parts];
        if let Some(last) = shares.last_mut() {
            last.0 += remainder;
        }
        shares
    }
}

impl Add for FixedPoint2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl AddAssign for FixedPoint2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FixedPoint2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl SubAssign for FixedPoint2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for FixedPoint2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl Mul<f32> for FixedPoint2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self::Output {
        Self::from_f64(self.as_f64() * f64::from(rhs))
    }
}

impl Sum for FixedPoint2 {
    /// Accumulates in `i64` and saturates once, so the result does not depend
    /// on the order of the terms.
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let wide: i64 = iter.map(|value| i64::from(value.0)).sum();
        Self(i32::try_from(wide).unwrap_or(if wide < 0 { i32::MIN } else { i32::MAX }))
    }
}

impl<'a> Sum<&'a FixedPoint2> for FixedPoint2 {
    fn sum<I: Iterator<Item = &'a FixedPoint2>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<i32> for FixedPoint2 {
    fn from(whole: i32) -> Self {
        Self::new(whole)
    }
}

impl fmt::Debug for FixedPoint2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint2({self})")
    }
}

impl fmt::Display for FixedPoint2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / MULTIPLIER as u32;
        let fraction = abs % MULTIPLIER as u32;

        if fraction == 0 {
            write!(f, "{sign}{whole}")
        } else if fraction % 10 == 0 {
            write!(f, "{sign}{whole}.{}", fraction / 10)
        } else {
            write!(f, "{sign}{whole}.{fraction:02}")
        }
    }
}

// Serialized as a plain number so content files and logs stay human-readable.
#[cfg(feature = "serde")]
impl serde::Serialize for FixedPoint2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FixedPoint2 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <f64 as serde::Deserialize>::deserialize(deserializer).map(Self::from_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_addition_is_exact() {
        let a = FixedPoint2::from_f64(0.1);
        let b = FixedPoint2::from_f64(0.2);
        assert_eq!(a + b, FixedPoint2::from_f64(0.3));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(FixedPoint2::from_f64(1.125).raw(), 113);
        assert_eq!(FixedPoint2::from_f64(-2.5).raw(), -250);
        assert_eq!(FixedPoint2::from_f64(f64::NAN), FixedPoint2::ZERO);
    }

    #[test]
    fn arithmetic_saturates() {
        assert_eq!(FixedPoint2::MAX + FixedPoint2::ONE, FixedPoint2::MAX);
        assert_eq!(FixedPoint2::MIN - FixedPoint2::ONE, FixedPoint2::MIN);
        assert_eq!(-FixedPoint2::MIN, FixedPoint2::MAX);
    }

    #[test]
    fn scaling_by_float_rounds() {
        assert_eq!(FixedPoint2::new(10) * 1.5, FixedPoint2::new(15));
        assert_eq!(FixedPoint2::new(1) * (1.0 / 3.0), FixedPoint2::from_raw(33));
        assert_eq!(FixedPoint2::new(7) * 0.0, FixedPoint2::ZERO);
    }

    #[test]
    fn split_keeps_total() {
        let shares = FixedPoint2::new(10).split(3);
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0], FixedPoint2::from_raw(333));
        assert_eq!(shares[2], FixedPoint2::from_raw(334));
        assert_eq!(shares.iter().sum::<FixedPoint2>(), FixedPoint2::new(10));
        assert!(FixedPoint2::new(5).split(0).is_empty());
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(FixedPoint2::new(12).to_string(), "12");
        assert_eq!(FixedPoint2::from_f64(12.5).to_string(), "12.5");
        assert_eq!(FixedPoint2::from_f64(0.25).to_string(), "0.25");
        assert_eq!(FixedPoint2::from_f64(-0.05).to_string(), "-0.05");
        assert_eq!(FixedPoint2::new(-4).to_string(), "-4");
    }
}
