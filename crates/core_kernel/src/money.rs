//! Money and quantity types with precise decimal arithmetic
//!
//! Every monetary field in the system passes through [`Money`] before it is
//! persisted or compared, so repeated additions never accumulate
//! floating-point drift.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Decimal places every stored monetary amount is rounded to.
const MONEY_DP: u32 = 2;

/// A monetary amount rounded to two decimal places.
///
/// Amounts round half away from zero, which matches conventional currency
/// rounding for retail values. The type is a thin wrapper around
/// [`rust_decimal::Decimal`]; arithmetic is exact and re-rounded, so a sum
/// of valid amounts is always itself a valid amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a monetary amount, rounding to two decimal places.
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Coerces a float into money, substituting `fallback` for non-finite
    /// input. Never panics.
    pub fn from_f64_or(value: f64, fallback: Money) -> Self {
        Decimal::from_f64(value).map(Self::new).unwrap_or(fallback)
    }

    /// Coerces a float into money; non-finite input becomes zero.
    pub fn from_f64(value: f64) -> Self {
        Self::from_f64_or(value, Money::ZERO)
    }

    /// Returns the underlying decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Floors the amount at zero. Totals and due amounts never go negative.
    pub fn max_zero(&self) -> Self {
        if self.0.is_sign_negative() {
            Money::ZERO
        } else {
            *self
        }
    }

    /// Multiplies by a scalar, re-rounding the result.
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.0 * factor)
    }

    /// Clamps the amount into `[low, high]`.
    pub fn clamp(&self, low: Money, high: Money) -> Self {
        Self(self.0.clamp(low.0, high.0))
    }

    pub fn min(self, other: Money) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Money) -> Self {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money::new(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

/// A stock quantity.
///
/// Quantities are coerced like money but never rounded: fractional units
/// (e.g. 1.25 kg of a weighed product) stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    pub const ZERO: Quantity = Quantity(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Coerces a float into a quantity; non-finite input becomes zero.
    pub fn from_f64(value: f64) -> Self {
        Decimal::from_f64(value).map(Self).unwrap_or(Quantity::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn min(self, other: Quantity) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    pub fn max_zero(&self) -> Self {
        if self.0.is_sign_negative() {
            Quantity::ZERO
        } else {
            *self
        }
    }

    /// Extends a unit cost across this quantity, producing money.
    pub fn times_cost(&self, unit_cost: Money) -> Money {
        Money::new(self.0 * unit_cost.amount())
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::ZERO
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Quantity(value)
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Quantity(Decimal::from(value))
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::ZERO, |acc, q| acc + q)
    }
}
