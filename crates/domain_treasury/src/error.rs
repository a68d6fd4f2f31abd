//! Treasury domain errors

use core_kernel::Money;
use thiserror::Error;

use crate::account::AccountType;

/// Errors from treasury operations
#[derive(Debug, Error)]
pub enum TreasuryError {
    #[error("Insufficient {account_type} funds for {purpose}: available {available}, required {required}")]
    InsufficientFunds {
        account_type: AccountType,
        available: Money,
        required: Money,
        purpose: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl TreasuryError {
    pub fn validation(message: impl Into<String>) -> Self {
        TreasuryError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        TreasuryError::NotFound(message.into())
    }
}
