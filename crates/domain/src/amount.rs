//! Floating-point monetary amount.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A monetary amount.
///
/// Single precision (`f32`), compared with exact equality. Settlement
/// requires the approved remainder to be exactly `0.0`, so charges that do
/// not subtract cleanly in `f32` leave a non-zero remainder: a `0.3` total
/// minus `0.1` minus `0.2` is about `1.5e-8`, not zero.
///
/// Values built from `f64` are rounded to the nearest `f32`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(f32);

impl Amount {
    /// Creates an amount from a raw value.
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Returns zero.
    pub const fn zero() -> Self {
        Self(0.0)
    }

    /// Returns the raw value.
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Returns true if the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Returns true if the amount is below zero.
    pub fn is_negative(&self) -> bool {
        self.0 < 0.0
    }

    /// Returns true if the amount is neither NaN nor infinite.
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<f32> for Amount {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self(value as f32)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), Add::add)
    }
}
