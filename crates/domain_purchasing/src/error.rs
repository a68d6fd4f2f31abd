//! Purchasing domain errors

use core_kernel::CoreError;
use domain_inventory::InventoryError;
use domain_treasury::TreasuryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PurchasingError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl PurchasingError {
    pub fn validation(message: impl Into<String>) -> Self {
        PurchasingError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        PurchasingError::NotFound(message.into())
    }
}

impl From<CoreError> for PurchasingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => PurchasingError::Validation(msg),
            CoreError::NotFound(msg) => PurchasingError::NotFound(msg),
        }
    }
}
