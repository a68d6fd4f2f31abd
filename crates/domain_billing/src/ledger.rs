//! Customer ledger
//!
//! An append-only trail of what each customer owes the business. A credit
//! sale debits the ledger by the amount left due; payments and return
//! credits reduce it. Outstanding balance is always recomputed from the
//! entries, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, LedgerEntryId, Money};

use crate::error::BillingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    /// Increases what the customer owes
    Debit,
    /// Decreases what the customer owes
    Credit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub customer_id: CustomerId,
    pub entry_type: EntryType,
    pub amount: Money,
    /// Document number of the invoice, payment, or return
    pub reference: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Append-only customer ledger.
#[derive(Debug, Default)]
pub struct CustomerLedger {
    entries: Vec<LedgerEntry>,
}

impl CustomerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Amounts must be positive; a zero movement has no
    /// business meaning and is rejected so callers skip it explicitly.
    pub fn post(
        &mut self,
        customer_id: CustomerId,
        entry_type: EntryType,
        amount: Money,
        reference: &str,
        note: Option<String>,
    ) -> Result<LedgerEntryId, BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::validation(format!(
                "ledger amount must be positive, got {amount}"
            )));
        }
        let entry = LedgerEntry {
            id: LedgerEntryId::new_v7(),
            customer_id,
            entry_type,
            amount,
            reference: reference.to_string(),
            note,
            created_at: Utc::now(),
        };
        let id = entry.id;
        self.entries.push(entry);
        Ok(id)
    }

    pub fn debit(
        &mut self,
        customer_id: CustomerId,
        amount: Money,
        reference: &str,
    ) -> Result<LedgerEntryId, BillingError> {
        self.post(customer_id, EntryType::Debit, amount, reference, None)
    }

    pub fn credit(
        &mut self,
        customer_id: CustomerId,
        amount: Money,
        reference: &str,
    ) -> Result<LedgerEntryId, BillingError> {
        self.post(customer_id, EntryType::Credit, amount, reference, None)
    }

    /// What the customer currently owes: debits minus credits.
    pub fn outstanding(&self, customer_id: CustomerId) -> Money {
        self.entries
            .iter()
            .filter(|e| e.customer_id == customer_id)
            .map(|e| match e.entry_type {
                EntryType::Debit => e.amount,
                EntryType::Credit => -e.amount,
            })
            .sum()
    }

    /// Total owed across all customers, counting only net debtors. A
    /// customer the business owes does not offset another's debt.
    pub fn total_outstanding(&self) -> Money {
        let mut per_customer: std::collections::HashMap<CustomerId, Money> =
            std::collections::HashMap::new();
        for entry in &self.entries {
            let signed = match entry.entry_type {
                EntryType::Debit => entry.amount,
                EntryType::Credit => -entry.amount,
            };
            *per_customer.entry(entry.customer_id).or_default() += signed;
        }
        per_customer.values().map(|m| m.max_zero()).sum()
    }

    /// Full history for one customer, oldest first.
    pub fn entries_for(&self, customer_id: CustomerId) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.customer_id == customer_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_outstanding_is_debits_minus_credits() {
        let mut ledger = CustomerLedger::new();
        let customer = CustomerId::new();

        ledger.debit(customer, Money::new(dec!(45)), "SAL-1").unwrap();
        ledger.credit(customer, Money::new(dec!(20)), "SPAY-1").unwrap();

        assert_eq!(ledger.outstanding(customer), Money::new(dec!(25)));
        assert_eq!(ledger.entries_for(customer).len(), 2);
    }

    #[test]
    fn test_overpaid_customer_shows_negative_outstanding() {
        let mut ledger = CustomerLedger::new();
        let customer = CustomerId::new();

        ledger.debit(customer, Money::new(dec!(30)), "SAL-2").unwrap();
        ledger.credit(customer, Money::new(dec!(50)), "RET-1").unwrap();

        // A net credit means the business owes the customer.
        assert_eq!(ledger.outstanding(customer), Money::new(dec!(-20)));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut ledger = CustomerLedger::new();
        let err = ledger.debit(CustomerId::new(), Money::ZERO, "SAL-3").unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[test]
    fn test_customers_are_isolated() {
        let mut ledger = CustomerLedger::new();
        let a = CustomerId::new();
        let b = CustomerId::new();

        ledger.debit(a, Money::new(dec!(10)), "SAL-4").unwrap();
        assert_eq!(ledger.outstanding(b), Money::ZERO);
    }
}
