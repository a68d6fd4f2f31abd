//! FIFO stock ledger
//!
//! The ledger tracks every batch per product and branch and consumes stock
//! in first-in-first-out order. Consumption is planned before it is applied:
//! a plan either covers the full requested quantity or the operation fails
//! with nothing changed.
//!
//! # Invariants
//!
//! - Batch remaining quantities never go negative
//! - Consumption draws from batches ordered by expiry date (soonest first,
//!   batches without expiry last), then by receipt order
//! - Cost of goods is the exact sum of drawn quantity times batch unit cost

use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;

use core_kernel::{
    document::{self, prefix},
    BatchId, BranchId, Money, MovementId, ProductId, Quantity,
};

use crate::batch::{NewBatch, StockBatch};
use crate::error::InventoryError;
use crate::movement::{MovementType, StockMovement};

/// One slice of a consumption plan, drawn from a single batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDraw {
    pub batch_id: BatchId,
    pub quantity: Quantity,
    pub unit_cost: Money,
}

/// A fully-resolved plan to consume stock for one product.
///
/// Plans are computed against the current batch state without mutating it.
/// Applying the plan is then a pure bookkeeping step, so a multi-line
/// operation can plan every line first and only mutate once all lines fit.
#[derive(Debug, Clone)]
pub struct ConsumptionPlan {
    pub product_id: ProductId,
    pub branch_id: BranchId,
    pub requested: Quantity,
    pub draws: Vec<BatchDraw>,
    /// Sum of draw quantity times batch unit cost
    pub cost_of_goods: Money,
}

impl ConsumptionPlan {
    /// Average acquisition cost per unit across the plan's draws.
    pub fn blended_unit_cost(&self) -> Money {
        if self.requested.is_positive() {
            Money::new(self.cost_of_goods.amount() / self.requested.value())
        } else {
            Money::ZERO
        }
    }
}

/// Outcome of a stock adjustment.
#[derive(Debug, Clone)]
pub struct AdjustmentOutcome {
    pub movement_id: MovementId,
    /// Magnitude of the change
    pub quantity: Quantity,
    pub unit_cost: Money,
    /// Batch created for an upward adjustment
    pub batch_id: Option<BatchId>,
    pub doc_number: String,
}

/// In-memory batch store with FIFO consumption.
#[derive(Debug, Default)]
pub struct StockLedger {
    batches: HashMap<(ProductId, BranchId), Vec<StockBatch>>,
    movements: Vec<StockMovement>,
    next_seq: u64,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receives a new batch of stock.
    ///
    /// # Errors
    ///
    /// Rejects non-positive quantities and negative unit costs.
    pub fn receive_batch(&mut self, input: NewBatch) -> Result<BatchId, InventoryError> {
        if !input.quantity.is_positive() {
            return Err(InventoryError::validation(format!(
                "batch quantity must be positive, got {}",
                input.quantity
            )));
        }
        if input.unit_cost.is_negative() {
            return Err(InventoryError::InvalidUnitCost(input.unit_cost));
        }

        let batch = StockBatch {
            id: BatchId::new_v7(),
            product_id: input.product_id,
            branch_id: input.branch_id,
            quantity_remaining: input.quantity,
            unit_cost: input.unit_cost,
            sell_price: input.sell_price,
            batch_number: input.batch_number,
            expiry_date: input.expiry_date,
            purchase_item_id: input.purchase_item_id,
            created_at: Utc::now(),
            receipt_seq: self.next_seq,
        };
        self.next_seq += 1;

        let id = batch.id;
        self.batches
            .entry((input.product_id, input.branch_id))
            .or_default()
            .push(batch);
        Ok(id)
    }

    /// Looks up a batch by id.
    pub fn batch(&self, id: BatchId) -> Option<&StockBatch> {
        self.batches.values().flatten().find(|b| b.id == id)
    }

    /// Total units remaining for a product at a branch.
    pub fn current_stock(&self, product_id: ProductId, branch_id: BranchId) -> Quantity {
        self.batches
            .get(&(product_id, branch_id))
            .map(|batches| batches.iter().map(|b| b.quantity_remaining).sum())
            .unwrap_or(Quantity::ZERO)
    }

    /// Live batches for a product at a branch, in consumption order.
    pub fn fifo_batches(&self, product_id: ProductId, branch_id: BranchId) -> Vec<&StockBatch> {
        let mut live: Vec<&StockBatch> = self
            .batches
            .get(&(product_id, branch_id))
            .map(|batches| batches.iter().filter(|b| !b.is_depleted()).collect())
            .unwrap_or_default();
        live.sort_by(|a, b| fifo_order(a, b));
        live
    }

    /// Average unit cost across remaining stock, zero when empty.
    pub fn blended_unit_cost(&self, product_id: ProductId, branch_id: BranchId) -> Money {
        let live = self.fifo_batches(product_id, branch_id);
        let total_qty: Quantity = live.iter().map(|b| b.quantity_remaining).sum();
        if !total_qty.is_positive() {
            return Money::ZERO;
        }
        let total_cost: Money = live
            .iter()
            .map(|b| b.quantity_remaining.times_cost(b.unit_cost))
            .sum();
        Money::new(total_cost.amount() / total_qty.value())
    }

    /// Value of remaining stock at a branch, priced at batch cost.
    pub fn stock_value(&self, branch_id: BranchId) -> Money {
        self.batches
            .iter()
            .filter(|((_, b), _)| *b == branch_id)
            .flat_map(|(_, batches)| batches.iter())
            .map(|b| b.quantity_remaining.max_zero().times_cost(b.unit_cost))
            .sum()
    }

    /// Plans FIFO consumption for a single product without mutating state.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InsufficientStock`] when remaining stock
    /// cannot cover the requested quantity.
    pub fn plan_consumption(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
        quantity: Quantity,
    ) -> Result<ConsumptionPlan, InventoryError> {
        let mut reserved = HashMap::new();
        self.plan_with_reserved(product_id, branch_id, quantity, &mut reserved)
    }

    /// Plans FIFO consumption for several lines at once.
    ///
    /// Lines sharing a product draw from the same pool: the second line only
    /// sees what the first left behind. Either every line fits or the whole
    /// call fails and nothing is reserved.
    pub fn plan_many(
        &self,
        branch_id: BranchId,
        requests: &[(ProductId, Quantity)],
    ) -> Result<Vec<ConsumptionPlan>, InventoryError> {
        let mut reserved: HashMap<BatchId, Quantity> = HashMap::new();
        let mut plans = Vec::with_capacity(requests.len());
        for (product_id, quantity) in requests {
            plans.push(self.plan_with_reserved(*product_id, branch_id, *quantity, &mut reserved)?);
        }
        Ok(plans)
    }

    fn plan_with_reserved(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
        quantity: Quantity,
        reserved: &mut HashMap<BatchId, Quantity>,
    ) -> Result<ConsumptionPlan, InventoryError> {
        if !quantity.is_positive() {
            return Err(InventoryError::validation(format!(
                "consumption quantity must be positive, got {quantity}"
            )));
        }

        let mut remaining = quantity;
        let mut draws = Vec::new();
        let mut cost_of_goods = Money::ZERO;

        for batch in self.fifo_batches(product_id, branch_id) {
            if !remaining.is_positive() {
                break;
            }
            let already = reserved.get(&batch.id).copied().unwrap_or(Quantity::ZERO);
            let available = (batch.quantity_remaining - already).max_zero();
            if !available.is_positive() {
                continue;
            }

            let take = available.min(remaining);
            draws.push(BatchDraw {
                batch_id: batch.id,
                quantity: take,
                unit_cost: batch.unit_cost,
            });
            cost_of_goods += take.times_cost(batch.unit_cost);
            *reserved.entry(batch.id).or_insert(Quantity::ZERO) += take;
            remaining -= take;
        }

        if remaining.is_positive() {
            return Err(InventoryError::InsufficientStock {
                product_id,
                requested: quantity,
                missing: remaining,
            });
        }

        Ok(ConsumptionPlan {
            product_id,
            branch_id,
            requested: quantity,
            draws,
            cost_of_goods,
        })
    }

    /// Applies a previously computed plan, decrementing batch quantities.
    ///
    /// # Errors
    ///
    /// Fails if the plan no longer matches the batch state, for example
    /// because stock was consumed between planning and applying. Callers
    /// plan and apply within one unit of work, so this indicates a bug.
    pub fn apply_plan(&mut self, plan: &ConsumptionPlan) -> Result<(), InventoryError> {
        let batches = self
            .batches
            .get_mut(&(plan.product_id, plan.branch_id))
            .ok_or_else(|| InventoryError::not_found(format!("product {}", plan.product_id)))?;

        for draw in &plan.draws {
            let batch = batches
                .iter_mut()
                .find(|b| b.id == draw.batch_id)
                .ok_or_else(|| InventoryError::not_found(format!("batch {}", draw.batch_id)))?;
            if batch.quantity_remaining < draw.quantity {
                return Err(InventoryError::validation(format!(
                    "stale consumption plan for batch {}",
                    draw.batch_id
                )));
            }
            batch.quantity_remaining -= draw.quantity;
        }
        Ok(())
    }

    /// Plans and immediately applies FIFO consumption for one product.
    pub fn consume_fifo(
        &mut self,
        product_id: ProductId,
        branch_id: BranchId,
        quantity: Quantity,
    ) -> Result<ConsumptionPlan, InventoryError> {
        let plan = self.plan_consumption(product_id, branch_id, quantity)?;
        self.apply_plan(&plan)?;
        Ok(plan)
    }

    /// Appends a movement journal entry.
    pub fn record_movement(
        &mut self,
        product_id: ProductId,
        branch_id: BranchId,
        movement_type: MovementType,
        quantity: Quantity,
        unit_cost: Money,
        reference: Option<String>,
    ) -> MovementId {
        let movement = StockMovement {
            id: MovementId::new_v7(),
            product_id,
            branch_id,
            movement_type,
            quantity,
            unit_cost,
            reference,
            occurred_at: Utc::now(),
        };
        let id = movement.id;
        self.movements.push(movement);
        id
    }

    /// Movement history for a product at a branch, oldest first.
    pub fn movements_for(&self, product_id: ProductId, branch_id: BranchId) -> Vec<&StockMovement> {
        self.movements
            .iter()
            .filter(|m| m.product_id == product_id && m.branch_id == branch_id)
            .collect()
    }

    /// Adjusts stock up or down by `delta`.
    ///
    /// Upward adjustments create a fresh batch costed at `unit_cost`, or at
    /// the current blended cost when none is given. Downward adjustments
    /// consume FIFO like a sale. Either way an ADJUSTMENT movement is
    /// recorded under a generated document number.
    pub fn adjust_stock(
        &mut self,
        product_id: ProductId,
        branch_id: BranchId,
        delta: Quantity,
        unit_cost: Option<Money>,
        sell_price: Money,
    ) -> Result<AdjustmentOutcome, InventoryError> {
        if delta.is_zero() {
            return Err(InventoryError::validation("adjustment delta must be non-zero"));
        }
        let doc = document::doc_number(prefix::STOCK_ADJUSTMENT);

        if delta.is_positive() {
            let cost = unit_cost.unwrap_or_else(|| self.blended_unit_cost(product_id, branch_id));
            let batch_id = self.receive_batch(NewBatch {
                product_id,
                branch_id,
                quantity: delta,
                unit_cost: cost,
                sell_price,
                batch_number: doc.clone(),
                expiry_date: None,
                purchase_item_id: None,
            })?;
            let movement_id = self.record_movement(
                product_id,
                branch_id,
                MovementType::Adjustment,
                delta,
                cost,
                Some(doc.clone()),
            );
            Ok(AdjustmentOutcome {
                movement_id,
                quantity: delta,
                unit_cost: cost,
                batch_id: Some(batch_id),
                doc_number: doc,
            })
        } else {
            let plan = self.consume_fifo(product_id, branch_id, delta.abs())?;
            let cost = plan.blended_unit_cost();
            let movement_id = self.record_movement(
                product_id,
                branch_id,
                MovementType::Adjustment,
                delta.abs(),
                cost,
                Some(doc.clone()),
            );
            Ok(AdjustmentOutcome {
                movement_id,
                quantity: delta.abs(),
                unit_cost: cost,
                batch_id: None,
                doc_number: doc,
            })
        }
    }
}

/// FIFO ordering: soonest expiry first, no-expiry last, receipt order as
/// the tie-breaker.
fn fifo_order(a: &StockBatch, b: &StockBatch) -> Ordering {
    match (a.expiry_date, b.expiry_date) {
        (Some(ea), Some(eb)) => ea.cmp(&eb).then(receipt_order(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => receipt_order(a, b),
    }
}

fn receipt_order(a: &StockBatch, b: &StockBatch) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then(a.receipt_seq.cmp(&b.receipt_seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn money(value: rust_decimal::Decimal) -> Money {
        Money::new(value)
    }

    fn qty(value: rust_decimal::Decimal) -> Quantity {
        Quantity::new(value)
    }

    fn batch_input(
        product_id: ProductId,
        branch_id: BranchId,
        quantity: Quantity,
        unit_cost: Money,
        expiry: Option<NaiveDate>,
    ) -> NewBatch {
        NewBatch {
            product_id,
            branch_id,
            quantity,
            unit_cost,
            sell_price: money(dec!(10)),
            batch_number: "BAT-TEST".to_string(),
            expiry_date: expiry,
            purchase_item_id: None,
        }
    }

    #[test]
    fn test_consumes_in_receipt_order_without_expiry() {
        let mut ledger = StockLedger::new();
        let product = ProductId::new();
        let branch = BranchId::new();

        ledger
            .receive_batch(batch_input(product, branch, qty(dec!(5)), money(dec!(2)), None))
            .unwrap();
        ledger
            .receive_batch(batch_input(product, branch, qty(dec!(5)), money(dec!(3)), None))
            .unwrap();

        let plan = ledger.consume_fifo(product, branch, qty(dec!(7))).unwrap();
        // 5 units at 2.00 then 2 units at 3.00
        assert_eq!(plan.cost_of_goods.amount(), dec!(16));
        assert_eq!(plan.draws.len(), 2);
        assert_eq!(ledger.current_stock(product, branch), qty(dec!(3)));
    }

    #[test]
    fn test_expiring_batches_consumed_first() {
        let mut ledger = StockLedger::new();
        let product = ProductId::new();
        let branch = BranchId::new();
        let expiry = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);

        // Received in this order: no expiry, late expiry, early expiry.
        ledger
            .receive_batch(batch_input(product, branch, qty(dec!(5)), money(dec!(1)), None))
            .unwrap();
        ledger
            .receive_batch(batch_input(
                product,
                branch,
                qty(dec!(5)),
                money(dec!(2)),
                expiry(2026, 12, 1),
            ))
            .unwrap();
        ledger
            .receive_batch(batch_input(
                product,
                branch,
                qty(dec!(5)),
                money(dec!(3)),
                expiry(2026, 6, 1),
            ))
            .unwrap();

        let plan = ledger.consume_fifo(product, branch, qty(dec!(8))).unwrap();
        // 5 units from the June batch at 3.00 plus 3 from December at 2.00.
        assert_eq!(plan.cost_of_goods.amount(), dec!(21));
        assert_eq!(plan.draws[0].unit_cost.amount(), dec!(3));
        assert_eq!(plan.draws[1].unit_cost.amount(), dec!(2));
    }

    #[test]
    fn test_insufficient_stock_reports_shortfall() {
        let mut ledger = StockLedger::new();
        let product = ProductId::new();
        let branch = BranchId::new();

        ledger
            .receive_batch(batch_input(product, branch, qty(dec!(3)), money(dec!(2)), None))
            .unwrap();

        let err = ledger.plan_consumption(product, branch, qty(dec!(10))).unwrap_err();
        match err {
            InventoryError::InsufficientStock { requested, missing, .. } => {
                assert_eq!(requested, qty(dec!(10)));
                assert_eq!(missing, qty(dec!(7)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Planning never mutates.
        assert_eq!(ledger.current_stock(product, branch), qty(dec!(3)));
    }

    #[test]
    fn test_plan_many_shares_the_pool() {
        let mut ledger = StockLedger::new();
        let product = ProductId::new();
        let branch = BranchId::new();

        ledger
            .receive_batch(batch_input(product, branch, qty(dec!(10)), money(dec!(2)), None))
            .unwrap();

        // Two lines of 6 each exceed the 10 on hand even though either
        // line alone would fit.
        let err = ledger
            .plan_many(branch, &[(product, qty(dec!(6))), (product, qty(dec!(6)))])
            .unwrap_err();
        assert!(matches!(err, InventoryError::InsufficientStock { .. }));
        assert_eq!(ledger.current_stock(product, branch), qty(dec!(10)));

        let plans = ledger
            .plan_many(branch, &[(product, qty(dec!(6))), (product, qty(dec!(4)))])
            .unwrap();
        assert_eq!(plans.len(), 2);
    }

    #[test]
    fn test_receive_rejects_bad_input() {
        let mut ledger = StockLedger::new();
        let product = ProductId::new();
        let branch = BranchId::new();

        let err = ledger
            .receive_batch(batch_input(product, branch, qty(dec!(0)), money(dec!(2)), None))
            .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));

        let err = ledger
            .receive_batch(batch_input(product, branch, qty(dec!(1)), money(dec!(-2)), None))
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidUnitCost(_)));
    }

    #[test]
    fn test_upward_adjustment_creates_batch() {
        let mut ledger = StockLedger::new();
        let product = ProductId::new();
        let branch = BranchId::new();

        let outcome = ledger
            .adjust_stock(product, branch, qty(dec!(4)), Some(money(dec!(2.5))), money(dec!(5)))
            .unwrap();
        assert!(outcome.batch_id.is_some());
        assert!(outcome.doc_number.starts_with("ADJ-"));
        assert_eq!(ledger.current_stock(product, branch), qty(dec!(4)));
        assert_eq!(ledger.movements_for(product, branch).len(), 1);
    }

    #[test]
    fn test_downward_adjustment_consumes_fifo() {
        let mut ledger = StockLedger::new();
        let product = ProductId::new();
        let branch = BranchId::new();

        ledger
            .receive_batch(batch_input(product, branch, qty(dec!(10)), money(dec!(2)), None))
            .unwrap();
        let outcome = ledger
            .adjust_stock(product, branch, qty(dec!(-3)), None, money(dec!(5)))
            .unwrap();
        assert_eq!(outcome.quantity, qty(dec!(3)));
        assert_eq!(outcome.unit_cost.amount(), dec!(2));
        assert_eq!(ledger.current_stock(product, branch), qty(dec!(7)));
    }

    #[test]
    fn test_blended_unit_cost() {
        let mut ledger = StockLedger::new();
        let product = ProductId::new();
        let branch = BranchId::new();

        ledger
            .receive_batch(batch_input(product, branch, qty(dec!(5)), money(dec!(2)), None))
            .unwrap();
        ledger
            .receive_batch(batch_input(product, branch, qty(dec!(5)), money(dec!(4)), None))
            .unwrap();

        assert_eq!(ledger.blended_unit_cost(product, branch).amount(), dec!(3));
    }
}
