//! Comprehensive tests for domain_billing
//!
//! Covers the invoice totals engine, loyalty accrual and reversal, and the
//! customer ledger as they combine across a sale's lifetime.

use rust_decimal_macros::dec;

use core_kernel::{BranchId, CompanyId, Money};
use domain_billing::{
    points_for, BillingError, Customer, CustomerDirectory, CustomerLedger, EntryType,
    InvoiceTotals, LoyaltyTxType, PurchaseInvoiceStatus, SalesInvoiceStatus,
};

fn money(d: rust_decimal::Decimal) -> Money {
    Money::new(d)
}

mod totals_engine {
    use super::*;

    #[test]
    fn test_plain_invoice() {
        let t = InvoiceTotals::compute(money(dec!(200)), Money::ZERO, Money::ZERO, money(dec!(200)));
        assert_eq!(t.total, money(dec!(200)));
        assert_eq!(t.paid, money(dec!(200)));
        assert_eq!(t.due, Money::ZERO);
        assert_eq!(t.sales_status(), SalesInvoiceStatus::Paid);
    }

    #[test]
    fn test_discount_and_tax_shape_the_total() {
        let t = InvoiceTotals::compute(
            money(dec!(100)),
            money(dec!(15)),
            money(dec!(8.50)),
            Money::ZERO,
        );
        assert_eq!(t.total, money(dec!(93.50)));
        assert_eq!(t.due, money(dec!(93.50)));
        assert_eq!(t.sales_status(), SalesInvoiceStatus::Unpaid);
    }

    #[test]
    fn test_discount_larger_than_subtotal_floors_at_zero() {
        let t = InvoiceTotals::compute(money(dec!(50)), money(dec!(80)), Money::ZERO, Money::ZERO);
        assert_eq!(t.total, Money::ZERO);
        assert_eq!(t.due, Money::ZERO);
        // A written-off invoice was never paid, so it does not count as one.
        assert_eq!(t.sales_status(), SalesInvoiceStatus::Unpaid);
        assert_eq!(t.purchase_status(), PurchaseInvoiceStatus::Ordered);
    }

    #[test]
    fn test_overpayment_is_clamped() {
        let t = InvoiceTotals::compute(money(dec!(60)), Money::ZERO, Money::ZERO, money(dec!(100)));
        assert_eq!(t.paid, money(dec!(60)));
        assert_eq!(t.due, Money::ZERO);
    }

    #[test]
    fn test_negative_payment_is_treated_as_zero() {
        let t = InvoiceTotals::compute(money(dec!(60)), Money::ZERO, Money::ZERO, money(dec!(-5)));
        assert_eq!(t.paid, Money::ZERO);
        assert_eq!(t.due, money(dec!(60)));
    }

    #[test]
    fn test_with_paid_rebalances() {
        let t = InvoiceTotals::compute(money(dec!(80)), Money::ZERO, Money::ZERO, money(dec!(30)));
        let settled = t.with_paid(money(dec!(80)));
        assert_eq!(settled.paid, money(dec!(80)));
        assert_eq!(settled.due, Money::ZERO);
        assert_eq!(settled.total, t.total);
    }

    #[test]
    fn test_purchase_statuses() {
        let t = InvoiceTotals::compute(money(dec!(100)), Money::ZERO, Money::ZERO, Money::ZERO);
        assert_eq!(t.purchase_status(), PurchaseInvoiceStatus::Ordered);
        assert_eq!(
            t.with_paid(money(dec!(40))).purchase_status(),
            PurchaseInvoiceStatus::Partial
        );
        assert_eq!(
            t.with_paid(money(dec!(100))).purchase_status(),
            PurchaseInvoiceStatus::Received
        );
    }
}

mod loyalty {
    use super::*;

    fn directory_with_customer() -> (CustomerDirectory, core_kernel::CustomerId) {
        let mut directory = CustomerDirectory::new();
        let id = directory.add(Customer::new(CompanyId::new(), "Rami"));
        (directory, id)
    }

    #[test]
    fn test_points_are_one_per_hundred_floored() {
        assert_eq!(points_for(money(dec!(99.99))), 0);
        assert_eq!(points_for(money(dec!(100.00))), 1);
        assert_eq!(points_for(money(dec!(1049))), 10);
        assert_eq!(points_for(money(dec!(-200))), 0);
    }

    #[test]
    fn test_small_sale_earns_nothing_and_logs_nothing() {
        let (mut directory, id) = directory_with_customer();
        let tx = directory.award_loyalty(id, money(dec!(40)), "SAL-1").unwrap();
        assert!(tx.is_none());
        assert!(directory.loyalty_history(id).is_empty());
    }

    #[test]
    fn test_award_then_reverse_round_trip() {
        let (mut directory, id) = directory_with_customer();
        directory.award_loyalty(id, money(dec!(350)), "SAL-1").unwrap();
        assert_eq!(directory.get(id).unwrap().loyalty_points, 3);

        let tx = directory
            .reverse_loyalty(id, money(dec!(350)), "RET-1")
            .unwrap()
            .unwrap();
        assert_eq!(tx.tx_type, LoyaltyTxType::Reversal);
        assert_eq!(tx.points, 3);
        assert_eq!(directory.get(id).unwrap().loyalty_points, 0);
    }

    #[test]
    fn test_reversal_never_drives_balance_negative() {
        let (mut directory, id) = directory_with_customer();
        directory.award_loyalty(id, money(dec!(100)), "SAL-1").unwrap();

        // The return is worth more points than the customer holds.
        let tx = directory
            .reverse_loyalty(id, money(dec!(900)), "RET-1")
            .unwrap()
            .unwrap();
        assert_eq!(tx.points, 1);
        assert_eq!(directory.get(id).unwrap().loyalty_points, 0);
    }

    #[test]
    fn test_history_keeps_both_directions() {
        let (mut directory, id) = directory_with_customer();
        directory.award_loyalty(id, money(dec!(200)), "SAL-1").unwrap();
        directory.reverse_loyalty(id, money(dec!(100)), "RET-1").unwrap();

        let history = directory.loyalty_history(id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].tx_type, LoyaltyTxType::Earn);
        assert_eq!(history[1].tx_type, LoyaltyTxType::Reversal);
    }

    #[test]
    fn test_unknown_customer_is_reported() {
        let mut directory = CustomerDirectory::new();
        let err = directory
            .award_loyalty(core_kernel::CustomerId::new(), money(dec!(200)), "SAL-1")
            .unwrap_err();
        assert!(matches!(err, BillingError::NotFound(_)));
    }

    #[test]
    fn test_branch_bound_customer_is_invisible_elsewhere() {
        let home = BranchId::new();
        let mut directory = CustomerDirectory::new();
        let id = directory.add(Customer::new(CompanyId::new(), "Noor").for_branch(home));

        assert!(directory.expect_at(id, home).is_ok());
        assert!(directory.expect_at(id, BranchId::new()).is_err());
    }
}

mod customer_ledger {
    use super::*;
    use core_kernel::CustomerId;

    #[test]
    fn test_outstanding_is_debits_minus_credits() {
        let mut ledger = CustomerLedger::new();
        let customer = CustomerId::new();

        ledger.debit(customer, money(dec!(80)), "SAL-1").unwrap();
        ledger.credit(customer, money(dec!(30)), "SPAY-1").unwrap();
        assert_eq!(ledger.outstanding(customer), money(dec!(50)));
    }

    #[test]
    fn test_zero_and_negative_postings_are_rejected() {
        let mut ledger = CustomerLedger::new();
        let customer = CustomerId::new();

        assert!(ledger.debit(customer, Money::ZERO, "SAL-1").is_err());
        assert!(ledger.credit(customer, money(dec!(-5)), "SPAY-1").is_err());
        assert!(ledger.entries_for(customer).is_empty());
    }

    #[test]
    fn test_overpaid_customer_does_not_offset_other_debts() {
        let mut ledger = CustomerLedger::new();
        let debtor = CustomerId::new();
        let creditor = CustomerId::new();

        ledger.debit(debtor, money(dec!(100)), "SAL-1").unwrap();
        // This customer holds a 40 credit with the shop.
        ledger.credit(creditor, money(dec!(40)), "RET-1").unwrap();

        assert_eq!(ledger.outstanding(creditor), money(dec!(-40)));
        assert_eq!(ledger.total_outstanding(), money(dec!(100)));
    }

    #[test]
    fn test_entries_keep_their_references() {
        let mut ledger = CustomerLedger::new();
        let customer = CustomerId::new();

        ledger.debit(customer, money(dec!(10)), "SAL-9").unwrap();
        let entries = ledger.entries_for(customer);
        assert_eq!(entries[0].entry_type, EntryType::Debit);
        assert_eq!(entries[0].reference, "SAL-9");
    }
}
