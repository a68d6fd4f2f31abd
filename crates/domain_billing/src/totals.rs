//! Invoice totals engine
//!
//! One pure calculation shared by sales and purchasing: given a subtotal,
//! discount, tax, and whatever was paid, produce the invoice's total, the
//! accepted paid amount, the amount still due, and a settlement status.
//!
//! # Invariants
//!
//! - `total = max(subtotal - discount + tax, 0)`
//! - `paid` is clamped into `[0, total]`
//! - `due = total - paid`, never negative

use serde::{Deserialize, Serialize};

use core_kernel::Money;

/// Settlement state of a sales invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SalesInvoiceStatus {
    Paid,
    Partial,
    Unpaid,
}

/// Settlement state of a purchase invoice.
///
/// Purchases track the same three states under supplier-facing names: a
/// fully settled purchase is `Received`, an unpaid one is still `Ordered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PurchaseInvoiceStatus {
    Received,
    Partial,
    Ordered,
}

/// The computed money columns of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub paid: Money,
    pub due: Money,
}

impl InvoiceTotals {
    /// Computes totals from raw figures.
    ///
    /// The discount may exceed the subtotal (a goodwill write-off); the
    /// total floors at zero. An offered payment above the total is accepted
    /// only up to the total.
    pub fn compute(subtotal: Money, discount: Money, tax: Money, paid_amount: Money) -> Self {
        let total = (subtotal - discount + tax).max_zero();
        let paid = paid_amount.clamp(Money::ZERO, total);
        let due = total - paid;
        Self {
            subtotal,
            discount,
            tax,
            total,
            paid,
            due,
        }
    }

    /// Recomputes with a different cumulative paid amount.
    pub fn with_paid(&self, paid_amount: Money) -> Self {
        Self::compute(self.subtotal, self.discount, self.tax, paid_amount)
    }

    pub fn is_settled(&self) -> bool {
        self.due.is_zero()
    }

    pub fn sales_status(&self) -> SalesInvoiceStatus {
        if self.total.is_positive() && self.due.is_zero() {
            SalesInvoiceStatus::Paid
        } else if self.paid.is_positive() {
            SalesInvoiceStatus::Partial
        } else {
            SalesInvoiceStatus::Unpaid
        }
    }

    pub fn purchase_status(&self) -> PurchaseInvoiceStatus {
        if self.total.is_positive() && self.due.is_zero() {
            PurchaseInvoiceStatus::Received
        } else if self.paid.is_positive() {
            PurchaseInvoiceStatus::Partial
        } else {
            PurchaseInvoiceStatus::Ordered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(value: rust_decimal::Decimal) -> Money {
        Money::new(value)
    }

    #[test]
    fn test_basic_invoice() {
        let totals = InvoiceTotals::compute(
            money(dec!(100)),
            money(dec!(10)),
            money(dec!(5)),
            money(dec!(50)),
        );
        assert_eq!(totals.total, money(dec!(95)));
        assert_eq!(totals.paid, money(dec!(50)));
        assert_eq!(totals.due, money(dec!(45)));
        assert_eq!(totals.sales_status(), SalesInvoiceStatus::Partial);
    }

    #[test]
    fn test_overpayment_clamped_to_total() {
        let totals = InvoiceTotals::compute(
            money(dec!(100)),
            money(dec!(10)),
            money(dec!(5)),
            money(dec!(150)),
        );
        assert_eq!(totals.paid, money(dec!(95)));
        assert_eq!(totals.due, Money::ZERO);
        assert_eq!(totals.sales_status(), SalesInvoiceStatus::Paid);
    }

    #[test]
    fn test_negative_offered_payment_treated_as_zero() {
        let totals = InvoiceTotals::compute(
            money(dec!(100)),
            Money::ZERO,
            Money::ZERO,
            money(dec!(-20)),
        );
        assert_eq!(totals.paid, Money::ZERO);
        assert_eq!(totals.sales_status(), SalesInvoiceStatus::Unpaid);
    }

    #[test]
    fn test_discount_exceeding_subtotal_floors_total() {
        let totals = InvoiceTotals::compute(
            money(dec!(50)),
            money(dec!(80)),
            Money::ZERO,
            Money::ZERO,
        );
        assert_eq!(totals.total, Money::ZERO);
        assert_eq!(totals.due, Money::ZERO);
        // Nothing was ever owed, so nothing was ever paid.
        assert_eq!(totals.sales_status(), SalesInvoiceStatus::Unpaid);
    }

    #[test]
    fn test_zero_total_is_never_settled() {
        let totals = InvoiceTotals::compute(Money::ZERO, Money::ZERO, Money::ZERO, Money::ZERO);
        assert_eq!(totals.sales_status(), SalesInvoiceStatus::Unpaid);
        assert_eq!(totals.purchase_status(), PurchaseInvoiceStatus::Ordered);
    }

    #[test]
    fn test_purchase_status_names() {
        let unpaid = InvoiceTotals::compute(money(dec!(200)), Money::ZERO, Money::ZERO, Money::ZERO);
        assert_eq!(unpaid.purchase_status(), PurchaseInvoiceStatus::Ordered);

        let part = unpaid.with_paid(money(dec!(50)));
        assert_eq!(part.purchase_status(), PurchaseInvoiceStatus::Partial);

        let settled = unpaid.with_paid(money(dec!(200)));
        assert_eq!(settled.purchase_status(), PurchaseInvoiceStatus::Received);
    }
}
