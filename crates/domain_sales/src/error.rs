//! Sales domain errors
//!
//! Sales operations touch stock, accounts, and the customer ledger, so
//! their failures wrap the underlying domain errors unchanged. Callers can
//! still match on the original variant (for example
//! `InventoryError::InsufficientStock`) through the wrapper.

use core_kernel::CoreError;
use domain_billing::BillingError;
use domain_inventory::InventoryError;
use domain_treasury::TreasuryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SalesError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl SalesError {
    pub fn validation(message: impl Into<String>) -> Self {
        SalesError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        SalesError::NotFound(message.into())
    }
}

impl From<CoreError> for SalesError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => SalesError::Validation(msg),
            CoreError::NotFound(msg) => SalesError::NotFound(msg),
        }
    }
}
