//! Fixed-point currency and the numeric casts that feed it.
//!
//! Balances, prices, and payouts are whole cents stored in an `i64`. Random
//! factors are drawn as `f64` and rounded back to cents exactly once, so
//! repeated trades never accumulate floating-point drift.

use num_traits::cast::cast;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

const CENTS_PER_DOLLAR: i64 = 100;

/// Round a f64 and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn round_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    if clamped >= max {
        return i64::MAX;
    }
    cast::<f64, i64>(clamped).unwrap_or(i64::MIN)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// An amount of money in cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn from_dollars(dollars: i64) -> Self {
        Self(dollars.saturating_mul(CENTS_PER_DOLLAR))
    }

    /// Convert a dollar amount, rounding to the nearest cent.
    #[must_use]
    pub fn from_dollars_f64(dollars: f64) -> Self {
        Self(round_f64_to_i64(dollars * i64_to_f64(CENTS_PER_DOLLAR)))
    }

    #[must_use]
    pub const fn as_cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn as_dollars_f64(self) -> f64 {
        i64_to_f64(self.0) / i64_to_f64(CENTS_PER_DOLLAR)
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Multiply by a unit count (shares, units, payout multiplier).
    #[must_use]
    pub const fn times(self, count: u32) -> Self {
        Self(self.0.saturating_mul(count as i64))
    }

    /// Scale by a floating-point factor, rounding to the nearest cent.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self(round_f64_to_i64(i64_to_f64(self.0) * factor))
    }

    /// Integer division by a unit count, rounded half away from zero.
    /// Division by zero yields zero.
    #[must_use]
    pub fn per_unit(self, count: u32) -> Self {
        if count == 0 {
            return Self::ZERO;
        }
        let count = i64::from(count);
        let half = count / 2;
        let rounded = if self.0 >= 0 {
            (self.0 + half) / count
        } else {
            (self.0 - half) / count
        };
        Self(rounded)
    }

    /// How many whole units of `price` fit into this amount.
    #[must_use]
    pub fn units_affordable(self, price: Self) -> u32 {
        if price.0 <= 0 || self.0 <= 0 {
            return 0;
        }
        u32::try_from(self.0 / price.0).unwrap_or(u32::MAX)
    }
}

impl Add for Cents {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Cents {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Cents {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let dollars = abs / 100;
        let cents = abs % 100;

        let digits = dollars.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{sign}${grouped}.{cents:02}")
    }
}
