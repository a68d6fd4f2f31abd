//! Inter-branch stock transfers
//!
//! A transfer consumes stock FIFO at the source branch and receives it at
//! the target branch as a single new batch per product, costed at the
//! blended cost of whatever the source batches yielded. Both sides of the
//! move land in the movement journal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    document::{self, prefix},
    BranchId, Money, ProductId, Quantity, TransferId, TransferItemId, UserId,
};

use crate::batch::NewBatch;
use crate::error::InventoryError;
use crate::ledger::StockLedger;
use crate::movement::MovementType;

/// Input for moving stock between branches.
#[derive(Debug, Clone)]
pub struct CreateTransfer {
    pub from_branch: BranchId,
    pub to_branch: BranchId,
    pub lines: Vec<TransferLine>,
    pub created_by: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct TransferLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// Selling price for the receiving batch; defaults to the source's
    /// blended cost when absent
    pub sell_price: Option<Money>,
}

/// A completed transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransfer {
    pub id: TransferId,
    pub doc_number: String,
    pub from_branch: BranchId,
    pub to_branch: BranchId,
    pub items: Vec<TransferItem>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferItem {
    pub id: TransferItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// Blended unit cost carried from the source batches
    pub unit_cost: Money,
}

/// Executes a transfer against the stock ledger.
///
/// Every line is planned before anything moves, so a shortfall on the last
/// line leaves both branches untouched.
///
/// # Errors
///
/// - Source and target must differ and at least one line is required
/// - Any line the source branch cannot cover fails the whole transfer
pub fn transfer_stock(
    ledger: &mut StockLedger,
    input: CreateTransfer,
) -> Result<StockTransfer, InventoryError> {
    if input.from_branch == input.to_branch {
        return Err(InventoryError::validation(
            "transfer source and target branches must differ",
        ));
    }
    if input.lines.is_empty() {
        return Err(InventoryError::validation("transfer requires at least one line"));
    }

    let requests: Vec<(ProductId, Quantity)> = input
        .lines
        .iter()
        .map(|line| (line.product_id, line.quantity))
        .collect();
    let plans = ledger.plan_many(input.from_branch, &requests)?;

    let doc_number = document::doc_number(prefix::STOCK_TRANSFER);
    let mut items = Vec::with_capacity(input.lines.len());

    for (line, plan) in input.lines.iter().zip(plans.iter()) {
        ledger.apply_plan(plan)?;
        let unit_cost = plan.blended_unit_cost();

        ledger.record_movement(
            line.product_id,
            input.from_branch,
            MovementType::TransferOut,
            line.quantity,
            unit_cost,
            Some(doc_number.clone()),
        );

        ledger.receive_batch(NewBatch {
            product_id: line.product_id,
            branch_id: input.to_branch,
            quantity: line.quantity,
            unit_cost,
            sell_price: line.sell_price.unwrap_or(unit_cost),
            batch_number: doc_number.clone(),
            expiry_date: None,
            purchase_item_id: None,
        })?;

        ledger.record_movement(
            line.product_id,
            input.to_branch,
            MovementType::TransferIn,
            line.quantity,
            unit_cost,
            Some(doc_number.clone()),
        );

        items.push(TransferItem {
            id: TransferItemId::new_v7(),
            product_id: line.product_id,
            quantity: line.quantity,
            unit_cost,
        });
    }

    tracing::info!(
        doc_number = %doc_number,
        from = %input.from_branch,
        to = %input.to_branch,
        lines = items.len(),
        "stock transfer completed"
    );

    Ok(StockTransfer {
        id: TransferId::new_v7(),
        doc_number,
        from_branch: input.from_branch,
        to_branch: input.to_branch,
        items,
        created_by: input.created_by,
        created_at: Utc::now(),
    })
}
