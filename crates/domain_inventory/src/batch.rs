//! Stock batches
//!
//! Every receipt of stock creates a batch carrying its own unit cost and
//! optional expiry date. Batches are immutable apart from the remaining
//! quantity, which only ever decreases as stock is consumed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, BranchId, Money, ProductId, PurchaseItemId, Quantity};

/// A lot of stock received at a single cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockBatch {
    pub id: BatchId,
    pub product_id: ProductId,
    pub branch_id: BranchId,
    /// Units still available for consumption
    pub quantity_remaining: Quantity,
    /// Acquisition cost per unit
    pub unit_cost: Money,
    /// Selling price captured at receipt time
    pub sell_price: Money,
    /// Human-readable lot number
    pub batch_number: String,
    pub expiry_date: Option<NaiveDate>,
    /// Purchase line that produced this batch, when applicable
    pub purchase_item_id: Option<PurchaseItemId>,
    pub created_at: DateTime<Utc>,
    /// Monotonic receipt order, tie-breaker for equal timestamps
    pub(crate) receipt_seq: u64,
}

impl StockBatch {
    pub fn is_depleted(&self) -> bool {
        !self.quantity_remaining.is_positive()
    }
}

/// Input for receiving a new batch of stock.
#[derive(Debug, Clone)]
pub struct NewBatch {
    pub product_id: ProductId,
    pub branch_id: BranchId,
    pub quantity: Quantity,
    pub unit_cost: Money,
    pub sell_price: Money,
    pub batch_number: String,
    pub expiry_date: Option<NaiveDate>,
    pub purchase_item_id: Option<PurchaseItemId>,
}
