//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the retail backend.
//! Fixtures are consistent and predictable so assertions can use exact
//! figures.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{BranchId, CompanyId, Money, Quantity};

/// The company every fixture entity belongs to.
///
/// Shared so products and customers built by different helpers end up in
/// the same tenant, the way a single test scenario expects.
pub static TEST_COMPANY: Lazy<CompanyId> = Lazy::new(CompanyId::new);

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn zero() -> Money {
        Money::ZERO
    }

    /// A small round amount, handy as a unit price
    pub fn ten() -> Money {
        Money::new(dec!(10.00))
    }

    /// A round amount big enough to earn one loyalty point
    pub fn hundred() -> Money {
        Money::new(dec!(100.00))
    }

    /// A comfortable opening balance for a branch account
    pub fn opening_float() -> Money {
        Money::new(dec!(5000.00))
    }

    /// An amount with cents, for rounding-sensitive assertions
    pub fn odd_cents() -> Money {
        Money::new(dec!(33.37))
    }
}

/// Fixture for Quantity test data
pub struct QuantityFixtures;

impl QuantityFixtures {
    pub fn one() -> Quantity {
        Quantity::new(dec!(1))
    }

    pub fn ten() -> Quantity {
        Quantity::new(dec!(10))
    }

    /// A fractional quantity, for weight-based products
    pub fn half_kilo() -> Quantity {
        Quantity::new(dec!(0.5))
    }
}

/// Fixture for date test data
pub struct DateFixtures;

impl DateFixtures {
    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// An expiry well in the past, for FIFO ordering tests
    pub fn expired() -> NaiveDate {
        Self::date(2020, 1, 31)
    }

    /// An expiry far enough out to never matter
    pub fn far_future() -> NaiveDate {
        Self::date(2099, 12, 31)
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn company() -> CompanyId {
        *TEST_COMPANY
    }

    pub fn branch() -> BranchId {
        BranchId::new()
    }
}
