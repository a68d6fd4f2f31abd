//! Branch account balances
//!
//! Each branch keeps three balances: cash in the drawer, the bank account,
//! and card-terminal receipts awaiting settlement. Every payment in or out
//! of the business moves exactly one of these balances, and an outbound
//! movement that would overdraw its account is rejected.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use core_kernel::{BranchId, Money};

use crate::error::TreasuryError;

/// The three balance buckets a branch holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    Cash,
    Bank,
    Card,
}

impl AccountType {
    pub const ALL: [AccountType; 3] = [AccountType::Cash, AccountType::Bank, AccountType::Card];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Cash => "CASH",
            AccountType::Bank => "BANK",
            AccountType::Card => "CARD",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a customer or the business settles an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    MobileWallet,
}

impl PaymentMethod {
    /// The account a payment of this method settles into or out of.
    ///
    /// Mobile wallet settlements clear through the bank account.
    pub fn account(&self) -> AccountType {
        match self {
            PaymentMethod::Cash => AccountType::Cash,
            PaymentMethod::Card => AccountType::Card,
            PaymentMethod::BankTransfer | PaymentMethod::MobileWallet => AccountType::Bank,
        }
    }
}

/// Direction of a balance movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
}

/// Snapshot of a branch's three balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BranchBalances {
    pub cash: Money,
    pub bank: Money,
    pub card: Money,
}

impl BranchBalances {
    pub fn total(&self) -> Money {
        self.cash + self.bank + self.card
    }

    pub fn get(&self, account: AccountType) -> Money {
        match account {
            AccountType::Cash => self.cash,
            AccountType::Bank => self.bank,
            AccountType::Card => self.card,
        }
    }
}

/// A balance movement that has been applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedMovement {
    pub branch_id: BranchId,
    pub account_type: AccountType,
    pub direction: Direction,
    pub amount: Money,
    pub balance_before: Money,
    pub balance_after: Money,
}

/// In-memory balance store, one row per branch and account.
///
/// Balances start at zero; an explicit [`AccountStore::set_balances`] seeds
/// opening figures. Movements are applied one at a time and an outbound
/// movement fails before any state changes when funds are short.
#[derive(Debug, Default)]
pub struct AccountStore {
    balances: HashMap<(BranchId, AccountType), Money>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance of one account at a branch.
    pub fn balance(&self, branch_id: BranchId, account: AccountType) -> Money {
        self.balances
            .get(&(branch_id, account))
            .copied()
            .unwrap_or(Money::ZERO)
    }

    /// Snapshot of all three balances at a branch.
    pub fn balances(&self, branch_id: BranchId) -> BranchBalances {
        BranchBalances {
            cash: self.balance(branch_id, AccountType::Cash),
            bank: self.balance(branch_id, AccountType::Bank),
            card: self.balance(branch_id, AccountType::Card),
        }
    }

    /// Overwrites a branch's balances with explicit figures.
    ///
    /// # Errors
    ///
    /// Negative figures are rejected; balances may only go negative through
    /// no path at all.
    pub fn set_balances(
        &mut self,
        branch_id: BranchId,
        balances: BranchBalances,
    ) -> Result<(), TreasuryError> {
        for account in AccountType::ALL {
            if balances.get(account).is_negative() {
                return Err(TreasuryError::validation(format!(
                    "{account} balance must not be negative"
                )));
            }
        }
        for account in AccountType::ALL {
            self.balances.insert((branch_id, account), balances.get(account));
        }
        Ok(())
    }

    /// Checks that an account can cover an upcoming outflow.
    ///
    /// Non-positive requirements always pass. The check does not reserve
    /// anything; callers perform it and the matching movement inside one
    /// unit of work.
    pub fn ensure_funds(
        &self,
        branch_id: BranchId,
        account: AccountType,
        required: Money,
        purpose: &str,
    ) -> Result<(), TreasuryError> {
        if !required.is_positive() {
            return Ok(());
        }
        let available = self.balance(branch_id, account);
        if available < required {
            return Err(TreasuryError::InsufficientFunds {
                account_type: account,
                available,
                required,
                purpose: purpose.to_string(),
            });
        }
        Ok(())
    }

    /// Moves money into or out of an account.
    ///
    /// A zero amount is a no-op that still reports the current balance.
    ///
    /// # Errors
    ///
    /// - Negative amounts fail validation
    /// - Outbound movements that would overdraw the account are rejected
    ///   with [`TreasuryError::InsufficientFunds`]
    pub fn apply_movement(
        &mut self,
        branch_id: BranchId,
        account: AccountType,
        direction: Direction,
        amount: Money,
        purpose: &str,
    ) -> Result<AppliedMovement, TreasuryError> {
        if amount.is_negative() {
            return Err(TreasuryError::validation(format!(
                "movement amount must not be negative, got {amount}"
            )));
        }

        let before = self.balance(branch_id, account);
        let after = match direction {
            Direction::In => before + amount,
            Direction::Out => {
                self.ensure_funds(branch_id, account, amount, purpose)?;
                before - amount
            }
        };

        self.balances.insert((branch_id, account), after);
        tracing::debug!(
            branch = %branch_id,
            account = %account,
            ?direction,
            amount = %amount,
            after = %after,
            purpose,
            "balance movement applied"
        );

        Ok(AppliedMovement {
            branch_id,
            account_type: account,
            direction,
            amount,
            balance_before: before,
            balance_after: after,
        })
    }
}
