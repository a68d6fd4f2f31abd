//! Customers and loyalty points
//!
//! The directory owns customer records and their loyalty balances. Points
//! are whole numbers: a sale earns one point per 100 of invoice total,
//! rounded down, and a return reverses points the same way but never below
//! a zero balance.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{BranchId, CompanyId, CustomerId, LoyaltyTxId, Money};

use crate::error::BillingError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub company_id: CompanyId,
    /// None means the customer is shared across branches
    pub branch_id: Option<BranchId>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub loyalty_points: i64,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(company_id: CompanyId, name: impl Into<String>) -> Self {
        Self {
            id: CustomerId::new_v7(),
            company_id,
            branch_id: None,
            name: name.into(),
            phone: None,
            email: None,
            loyalty_points: 0,
            created_at: Utc::now(),
        }
    }

    pub fn for_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn visible_at(&self, branch: BranchId) -> bool {
        self.branch_id.map(|own| own == branch).unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoyaltyTxType {
    Earn,
    Reversal,
}

/// A loyalty balance change, kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    pub id: LoyaltyTxId,
    pub customer_id: CustomerId,
    pub tx_type: LoyaltyTxType,
    pub points: i64,
    /// Document number of the sale or return behind the change
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

/// Points earned on an invoice total: one per full 100 spent.
pub fn points_for(total: Money) -> i64 {
    (total.amount() / Decimal::from(100))
        .floor()
        .to_i64()
        .unwrap_or(0)
        .max(0)
}

/// Customer records plus their loyalty history.
#[derive(Debug, Default)]
pub struct CustomerDirectory {
    customers: HashMap<CustomerId, Customer>,
    loyalty_log: Vec<LoyaltyTransaction>,
}

impl CustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, customer: Customer) -> CustomerId {
        let id = customer.id;
        self.customers.insert(id, customer);
        id
    }

    pub fn get(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.get(&id)
    }

    /// Resolves a customer for use at a branch; out-of-scope customers are
    /// reported as missing.
    pub fn expect_at(&self, id: CustomerId, branch: BranchId) -> Result<&Customer, BillingError> {
        self.customers
            .get(&id)
            .filter(|c| c.visible_at(branch))
            .ok_or_else(|| BillingError::not_found(format!("customer {id}")))
    }

    /// Awards points for a completed sale. Returns None when the total is
    /// too small to earn anything.
    pub fn award_loyalty(
        &mut self,
        customer_id: CustomerId,
        invoice_total: Money,
        reference: &str,
    ) -> Result<Option<LoyaltyTransaction>, BillingError> {
        let points = points_for(invoice_total);
        if points == 0 {
            return Ok(None);
        }
        let customer = self
            .customers
            .get_mut(&customer_id)
            .ok_or_else(|| BillingError::not_found(format!("customer {customer_id}")))?;
        customer.loyalty_points += points;

        let tx = LoyaltyTransaction {
            id: LoyaltyTxId::new_v7(),
            customer_id,
            tx_type: LoyaltyTxType::Earn,
            points,
            reference: reference.to_string(),
            created_at: Utc::now(),
        };
        self.loyalty_log.push(tx.clone());
        Ok(Some(tx))
    }

    /// Claws back points after a return, capped at the customer's balance
    /// so it never goes negative.
    pub fn reverse_loyalty(
        &mut self,
        customer_id: CustomerId,
        return_total: Money,
        reference: &str,
    ) -> Result<Option<LoyaltyTransaction>, BillingError> {
        let customer = self
            .customers
            .get_mut(&customer_id)
            .ok_or_else(|| BillingError::not_found(format!("customer {customer_id}")))?;

        let points = points_for(return_total).min(customer.loyalty_points);
        if points == 0 {
            return Ok(None);
        }
        customer.loyalty_points -= points;

        let tx = LoyaltyTransaction {
            id: LoyaltyTxId::new_v7(),
            customer_id,
            tx_type: LoyaltyTxType::Reversal,
            points,
            reference: reference.to_string(),
            created_at: Utc::now(),
        };
        self.loyalty_log.push(tx.clone());
        Ok(Some(tx))
    }

    /// Loyalty history for one customer, oldest first.
    pub fn loyalty_history(&self, customer_id: CustomerId) -> Vec<&LoyaltyTransaction> {
        self.loyalty_log
            .iter()
            .filter(|tx| tx.customer_id == customer_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_points_floor() {
        assert_eq!(points_for(Money::new(dec!(99.99))), 0);
        assert_eq!(points_for(Money::new(dec!(100))), 1);
        assert_eq!(points_for(Money::new(dec!(250))), 2);
        assert_eq!(points_for(Money::new(dec!(-50))), 0);
    }

    #[test]
    fn test_award_and_reverse() {
        let mut directory = CustomerDirectory::new();
        let id = directory.add(Customer::new(CompanyId::new(), "Asha"));

        let earned = directory
            .award_loyalty(id, Money::new(dec!(350)), "SAL-1")
            .unwrap()
            .unwrap();
        assert_eq!(earned.points, 3);
        assert_eq!(directory.get(id).unwrap().loyalty_points, 3);

        // Reversal of a 500 return wants 5 points but only 3 exist.
        let reversed = directory
            .reverse_loyalty(id, Money::new(dec!(500)), "RET-1")
            .unwrap()
            .unwrap();
        assert_eq!(reversed.points, 3);
        assert_eq!(directory.get(id).unwrap().loyalty_points, 0);
        assert_eq!(directory.loyalty_history(id).len(), 2);
    }

    #[test]
    fn test_small_total_earns_nothing() {
        let mut directory = CustomerDirectory::new();
        let id = directory.add(Customer::new(CompanyId::new(), "Ben"));
        let tx = directory
            .award_loyalty(id, Money::new(dec!(40)), "SAL-2")
            .unwrap();
        assert!(tx.is_none());
        assert!(directory.loyalty_history(id).is_empty());
    }

    #[test]
    fn test_branch_scoped_customer() {
        let mut directory = CustomerDirectory::new();
        let home = BranchId::new();
        let id = directory.add(Customer::new(CompanyId::new(), "Cara").for_branch(home));

        assert!(directory.expect_at(id, home).is_ok());
        assert!(matches!(
            directory.expect_at(id, BranchId::new()),
            Err(BillingError::NotFound(_))
        ));
    }
}
