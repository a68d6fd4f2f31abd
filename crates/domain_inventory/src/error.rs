//! Inventory domain errors

use core_kernel::{Money, ProductId, Quantity};
use thiserror::Error;

/// Errors from inventory operations
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Insufficient stock for product {product_id}: requested {requested}, short by {missing}")]
    InsufficientStock {
        product_id: ProductId,
        requested: Quantity,
        missing: Quantity,
    },

    #[error("Invalid unit cost {0} for stock receipt")]
    InvalidUnitCost(Money),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl InventoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        InventoryError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        InventoryError::NotFound(message.into())
    }
}
