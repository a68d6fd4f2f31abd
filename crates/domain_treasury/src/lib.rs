//! Treasury domain - branch balances and money flowing in or out
//!
//! Every payment in the system settles against one of three per-branch
//! accounts (cash, bank, card). The store rejects any outflow an account
//! cannot cover, which is the system-wide guard against negative balances.

pub mod account;
pub mod error;
pub mod spending;

pub use account::{
    AccountStore, AccountType, AppliedMovement, BranchBalances, Direction, PaymentMethod,
};
pub use error::TreasuryError;
pub use spending::{
    record_expense, record_withdrawal, CreateExpense, CreateWithdrawal, Expense, OwnerWithdrawal,
};
