//! Property-Based Test Generators
//!
//! Proptest strategies for generating random domain values that respect
//! the two-decimal money scale and positive-quantity invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Money, Quantity};
use domain_treasury::{AccountType, PaymentMethod};

/// Strategy for money in cents, non-negative, up to one million.
pub fn money_strategy() -> impl Strategy<Value = Money> {
    (0i64..=100_000_000).prop_map(|cents| Money::new(Decimal::new(cents, 2)))
}

/// Strategy for strictly positive money.
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (1i64..=100_000_000).prop_map(|cents| Money::new(Decimal::new(cents, 2)))
}

/// Strategy for positive whole-unit quantities.
pub fn quantity_strategy() -> impl Strategy<Value = Quantity> {
    (1i64..=10_000).prop_map(|units| Quantity::new(Decimal::from(units)))
}

/// Strategy for fractional quantities with up to three decimals.
pub fn fractional_quantity_strategy() -> impl Strategy<Value = Quantity> {
    (1i64..=10_000_000).prop_map(|milli| Quantity::new(Decimal::new(milli, 3)))
}

/// Strategy over every payment method.
pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::Card),
        Just(PaymentMethod::BankTransfer),
        Just(PaymentMethod::MobileWallet),
    ]
}

/// Strategy over every account type.
pub fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::Cash),
        Just(AccountType::Bank),
        Just(AccountType::Card),
    ]
}
