//! Expenses and owner withdrawals
//!
//! Both take money straight out of a branch account. They share the same
//! funds check as every other outflow, so an expense can never push a
//! balance below zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BranchId, ExpenseId, Money, UserId, WithdrawalId};

use crate::account::{AccountStore, Direction, PaymentMethod};
use crate::error::TreasuryError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub branch_id: BranchId,
    pub category: String,
    pub description: Option<String>,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub created_by: Option<UserId>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateExpense {
    pub branch_id: BranchId,
    pub category: String,
    pub description: Option<String>,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub created_by: Option<UserId>,
}

/// Money taken out of the business by its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerWithdrawal {
    pub id: WithdrawalId,
    pub branch_id: BranchId,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    pub created_by: Option<UserId>,
    pub withdrawn_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateWithdrawal {
    pub branch_id: BranchId,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    pub created_by: Option<UserId>,
}

/// Records an expense and deducts it from the paying account.
///
/// # Errors
///
/// - The amount must be positive and the category non-empty
/// - Fails with insufficient funds when the account cannot cover it
pub fn record_expense(
    store: &mut AccountStore,
    input: CreateExpense,
) -> Result<Expense, TreasuryError> {
    if !input.amount.is_positive() {
        return Err(TreasuryError::validation("expense amount must be positive"));
    }
    if input.category.trim().is_empty() {
        return Err(TreasuryError::validation("expense category is required"));
    }

    store.apply_movement(
        input.branch_id,
        input.payment_method.account(),
        Direction::Out,
        input.amount,
        "expense",
    )?;

    Ok(Expense {
        id: ExpenseId::new_v7(),
        branch_id: input.branch_id,
        category: input.category,
        description: input.description,
        amount: input.amount,
        payment_method: input.payment_method,
        created_by: input.created_by,
        paid_at: Utc::now(),
    })
}

/// Records an owner withdrawal and deducts it from the paying account.
///
/// # Errors
///
/// Same funds and amount rules as [`record_expense`].
pub fn record_withdrawal(
    store: &mut AccountStore,
    input: CreateWithdrawal,
) -> Result<OwnerWithdrawal, TreasuryError> {
    if !input.amount.is_positive() {
        return Err(TreasuryError::validation("withdrawal amount must be positive"));
    }

    store.apply_movement(
        input.branch_id,
        input.payment_method.account(),
        Direction::Out,
        input.amount,
        "owner withdrawal",
    )?;

    Ok(OwnerWithdrawal {
        id: WithdrawalId::new_v7(),
        branch_id: input.branch_id,
        amount: input.amount,
        payment_method: input.payment_method,
        note: input.note,
        created_by: input.created_by,
        withdrawn_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{AccountType, BranchBalances};
    use rust_decimal_macros::dec;

    fn funded_store(branch: BranchId) -> AccountStore {
        let mut store = AccountStore::new();
        store
            .set_balances(
                branch,
                BranchBalances {
                    cash: Money::new(dec!(100)),
                    bank: Money::new(dec!(500)),
                    card: Money::ZERO,
                },
            )
            .unwrap();
        store
    }

    #[test]
    fn test_expense_deducts_from_account() {
        let branch = BranchId::new();
        let mut store = funded_store(branch);

        let expense = record_expense(
            &mut store,
            CreateExpense {
                branch_id: branch,
                category: "Utilities".to_string(),
                description: Some("Electricity".to_string()),
                amount: Money::new(dec!(60)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

        assert_eq!(expense.amount, Money::new(dec!(60)));
        assert_eq!(store.balance(branch, AccountType::Cash), Money::new(dec!(40)));
    }

    #[test]
    fn test_expense_rejected_when_underfunded() {
        let branch = BranchId::new();
        let mut store = funded_store(branch);

        let err = record_expense(
            &mut store,
            CreateExpense {
                branch_id: branch,
                category: "Rent".to_string(),
                description: None,
                amount: Money::new(dec!(150)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap_err();

        assert!(matches!(err, TreasuryError::InsufficientFunds { .. }));
        assert_eq!(store.balance(branch, AccountType::Cash), Money::new(dec!(100)));
    }

    #[test]
    fn test_withdrawal_uses_payment_method_account() {
        let branch = BranchId::new();
        let mut store = funded_store(branch);

        record_withdrawal(
            &mut store,
            CreateWithdrawal {
                branch_id: branch,
                amount: Money::new(dec!(200)),
                payment_method: PaymentMethod::BankTransfer,
                note: None,
                created_by: None,
            },
        )
        .unwrap();

        assert_eq!(store.balance(branch, AccountType::Bank), Money::new(dec!(300)));
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        let branch = BranchId::new();
        let mut store = funded_store(branch);

        let err = record_expense(
            &mut store,
            CreateExpense {
                branch_id: branch,
                category: "Misc".to_string(),
                description: None,
                amount: Money::ZERO,
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, TreasuryError::Validation(_)));
    }
}
