//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than bare `assert_eq!`.

use core_kernel::{Money, Quantity};
use domain_billing::InvoiceTotals;

/// Asserts two money values are equal, naming what was compared.
///
/// # Panics
///
/// Panics with `what` in the message when the amounts differ.
pub fn assert_money_eq(actual: Money, expected: Money, what: &str) {
    assert_eq!(
        actual, expected,
        "{what}: expected {expected}, got {actual}"
    );
}

/// Asserts two quantities are equal, naming what was compared.
pub fn assert_quantity_eq(actual: Quantity, expected: Quantity, what: &str) {
    assert_eq!(
        actual, expected,
        "{what}: expected {expected}, got {actual}"
    );
}

/// Asserts the arithmetic identities every invoice must satisfy.
///
/// total is never negative, paid sits inside `[0, total]`, and due is the
/// exact remainder.
pub fn assert_totals_consistent(totals: &InvoiceTotals) {
    assert!(
        !totals.total.is_negative(),
        "invoice total went negative: {}",
        totals.total
    );
    assert!(
        !totals.paid.is_negative() && totals.paid <= totals.total,
        "paid {} outside [0, {}]",
        totals.paid,
        totals.total
    );
    assert_eq!(
        totals.total,
        totals.paid + totals.due,
        "total {} != paid {} + due {}",
        totals.total,
        totals.paid,
        totals.due
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_consistent_totals_pass() {
        let totals = InvoiceTotals::compute(
            Money::new(dec!(100)),
            Money::new(dec!(10)),
            Money::new(dec!(5)),
            Money::new(dec!(40)),
        );
        assert_totals_consistent(&totals);
    }

    #[test]
    #[should_panic(expected = "drawer balance")]
    fn test_money_mismatch_names_the_subject() {
        assert_money_eq(Money::new(dec!(1)), Money::new(dec!(2)), "drawer balance");
    }
}
