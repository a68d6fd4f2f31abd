//! Stock movement journal
//!
//! Movements are an append-only trail of every quantity change, one row per
//! batch touched. They never drive stock levels (batches do); they exist so
//! a count discrepancy can be traced back to its cause.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BranchId, Money, MovementId, ProductId, Quantity};

/// Why a quantity changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Purchase,
    Sale,
    Adjustment,
    Return,
    TransferIn,
    TransferOut,
}

impl MovementType {
    /// Whether this movement adds stock (true) or removes it (false).
    pub fn is_inbound(&self) -> bool {
        matches!(
            self,
            MovementType::Purchase | MovementType::Return | MovementType::TransferIn
        )
    }
}

/// A single entry in the movement journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub branch_id: BranchId,
    pub movement_type: MovementType,
    /// Magnitude of the change; direction comes from the movement type
    pub quantity: Quantity,
    /// Cost per unit moved
    pub unit_cost: Money,
    /// Document number of the business event behind this movement
    pub reference: Option<String>,
    pub occurred_at: DateTime<Utc>,
}
