//! Inventory repository
//!
//! Stock batches and movements on PostgreSQL. FIFO consumption locks the
//! candidate batches with `FOR UPDATE` so two concurrent sales cannot drain
//! the same units; the lock order matches the consumption order.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use core_kernel::{
    document::{self, prefix},
    BatchId, Money, ProductId, Quantity,
};
use domain_inventory::{
    CreateTransfer, InventoryError, MovementType, NewBatch, Product, StockTransfer, TransferItem,
};

use crate::error::DatabaseError;

/// One batch drawn from during a FIFO consumption.
#[derive(Debug, Clone)]
pub struct FifoDraw {
    pub batch_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

/// Result of consuming stock FIFO inside a transaction.
#[derive(Debug, Clone)]
pub struct FifoConsumption {
    pub draws: Vec<FifoDraw>,
    pub cost_of_goods: Money,
}

impl FifoConsumption {
    pub fn blended_unit_cost(&self, quantity: Decimal) -> Money {
        if quantity > Decimal::ZERO {
            Money::new(self.cost_of_goods.amount() / quantity)
        } else {
            Money::ZERO
        }
    }
}

#[derive(sqlx::FromRow)]
struct BatchRow {
    id: Uuid,
    quantity_remaining: Decimal,
    unit_cost: Decimal,
}

/// Consumes `quantity` of a product FIFO within an open transaction.
///
/// Locks the live batches in consumption order, verifies the full quantity
/// is available, then decrements each drawn batch. The caller's transaction
/// boundary makes the whole thing atomic.
pub(crate) async fn consume_fifo_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    branch_id: Uuid,
    quantity: Decimal,
) -> Result<FifoConsumption, DatabaseError> {
    if quantity <= Decimal::ZERO {
        return Err(DatabaseError::validation(format!(
            "consumption quantity must be positive, got {quantity}"
        )));
    }

    let batches: Vec<BatchRow> = sqlx::query_as(
        r#"
        SELECT id, quantity_remaining, unit_cost
        FROM stock_batches
        WHERE product_id = $1 AND branch_id = $2 AND quantity_remaining > 0
        ORDER BY expiry_date ASC NULLS LAST, created_at ASC, id ASC
        FOR UPDATE
        "#,
    )
    .bind(product_id)
    .bind(branch_id)
    .fetch_all(&mut **tx)
    .await?;

    let mut remaining = quantity;
    let mut draws = Vec::new();
    let mut cost = Decimal::ZERO;
    for batch in &batches {
        if remaining <= Decimal::ZERO {
            break;
        }
        let take = batch.quantity_remaining.min(remaining);
        cost += take * batch.unit_cost;
        draws.push(FifoDraw {
            batch_id: batch.id,
            quantity: take,
            unit_cost: batch.unit_cost,
        });
        remaining -= take;
    }

    if remaining > Decimal::ZERO {
        return Err(DatabaseError::Inventory(InventoryError::InsufficientStock {
            product_id: ProductId::from_uuid(product_id),
            requested: Quantity::new(quantity),
            missing: Quantity::new(remaining),
        }));
    }

    for draw in &draws {
        sqlx::query(
            "UPDATE stock_batches SET quantity_remaining = quantity_remaining - $1 WHERE id = $2",
        )
        .bind(draw.quantity)
        .bind(draw.batch_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(FifoConsumption {
        draws,
        cost_of_goods: Money::new(cost),
    })
}

/// Inserts a stock batch within an open transaction.
pub(crate) async fn insert_batch_tx(
    tx: &mut Transaction<'_, Postgres>,
    batch: &NewBatch,
) -> Result<Uuid, DatabaseError> {
    if !batch.quantity.is_positive() {
        return Err(DatabaseError::validation("batch quantity must be positive"));
    }
    if batch.unit_cost.is_negative() {
        return Err(DatabaseError::validation("batch unit cost must not be negative"));
    }

    let id = Uuid::now_v7();
    sqlx::query(
        r#"
        INSERT INTO stock_batches (
            id, product_id, branch_id, quantity_remaining, unit_cost,
            sell_price, batch_number, expiry_date, purchase_item_id, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(id)
    .bind(Uuid::from(batch.product_id))
    .bind(Uuid::from(batch.branch_id))
    .bind(batch.quantity.value())
    .bind(batch.unit_cost.amount())
    .bind(batch.sell_price.amount())
    .bind(&batch.batch_number)
    .bind(batch.expiry_date)
    .bind(batch.purchase_item_id.map(Uuid::from))
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;
    Ok(id)
}

/// Appends a stock movement within an open transaction.
pub(crate) async fn insert_movement_tx(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    branch_id: Uuid,
    movement_type: MovementType,
    quantity: Decimal,
    unit_cost: Decimal,
    reference: Option<&str>,
) -> Result<(), DatabaseError> {
    let type_str = match movement_type {
        MovementType::Purchase => "PURCHASE",
        MovementType::Sale => "SALE",
        MovementType::Adjustment => "ADJUSTMENT",
        MovementType::Return => "RETURN",
        MovementType::TransferIn => "TRANSFER_IN",
        MovementType::TransferOut => "TRANSFER_OUT",
    };
    sqlx::query(
        r#"
        INSERT INTO stock_movements (id, product_id, branch_id, movement_type, quantity, unit_cost, reference)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(product_id)
    .bind(branch_id)
    .bind(type_str)
    .bind(quantity)
    .bind(unit_cost)
    .bind(reference)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Repository for products, batches, and stock operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_product(&self, product: &Product) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, company_id, branch_id, name, sku, sell_price, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::from(product.id))
        .bind(Uuid::from(product.company_id))
        .bind(product.branch_id.map(Uuid::from))
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.sell_price.amount())
        .bind(product.active)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Total units remaining for a product at a branch.
    pub async fn current_stock(
        &self,
        product_id: ProductId,
        branch_id: core_kernel::BranchId,
    ) -> Result<Quantity, DatabaseError> {
        let total: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT SUM(quantity_remaining)
            FROM stock_batches
            WHERE product_id = $1 AND branch_id = $2
            "#,
        )
        .bind(Uuid::from(product_id))
        .bind(Uuid::from(branch_id))
        .fetch_one(&self.pool)
        .await?;
        Ok(Quantity::new(total.unwrap_or(Decimal::ZERO)))
    }

    /// Receives a standalone batch (opening stock, corrections).
    pub async fn receive_batch(&self, batch: &NewBatch) -> Result<BatchId, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let id = insert_batch_tx(&mut tx, batch).await?;
        tx.commit().await?;
        Ok(BatchId::from_uuid(id))
    }

    /// Adjusts stock up or down in one transaction, mirroring the in-memory
    /// ledger's behavior: upward creates a batch, downward consumes FIFO,
    /// both record an ADJUSTMENT movement.
    pub async fn adjust_stock(
        &self,
        product_id: ProductId,
        branch_id: core_kernel::BranchId,
        delta: Quantity,
        unit_cost: Option<Money>,
        sell_price: Money,
    ) -> Result<String, DatabaseError> {
        if delta.is_zero() {
            return Err(DatabaseError::validation("adjustment delta must be non-zero"));
        }
        let doc = document::doc_number(prefix::STOCK_ADJUSTMENT);
        let product = Uuid::from(product_id);
        let branch = Uuid::from(branch_id);

        let mut tx = self.pool.begin().await?;
        if delta.is_positive() {
            let cost = match unit_cost {
                Some(cost) => cost,
                None => self.blended_cost_tx(&mut tx, product, branch).await?,
            };
            insert_batch_tx(
                &mut tx,
                &NewBatch {
                    product_id,
                    branch_id,
                    quantity: delta,
                    unit_cost: cost,
                    sell_price,
                    batch_number: doc.clone(),
                    expiry_date: None,
                    purchase_item_id: None,
                },
            )
            .await?;
            insert_movement_tx(
                &mut tx,
                product,
                branch,
                MovementType::Adjustment,
                delta.value(),
                cost.amount(),
                Some(&doc),
            )
            .await?;
        } else {
            let consumed = consume_fifo_tx(&mut tx, product, branch, delta.abs().value()).await?;
            insert_movement_tx(
                &mut tx,
                product,
                branch,
                MovementType::Adjustment,
                delta.abs().value(),
                consumed.blended_unit_cost(delta.abs().value()).amount(),
                Some(&doc),
            )
            .await?;
        }
        tx.commit().await?;
        Ok(doc)
    }

    /// Moves stock between branches in one transaction.
    pub async fn transfer_stock(
        &self,
        input: &CreateTransfer,
    ) -> Result<StockTransfer, DatabaseError> {
        if input.from_branch == input.to_branch {
            return Err(DatabaseError::validation(
                "transfer source and target branches must differ",
            ));
        }
        if input.lines.is_empty() {
            return Err(DatabaseError::validation("transfer requires at least one line"));
        }

        let doc_number = document::doc_number(prefix::STOCK_TRANSFER);
        let transfer_id = Uuid::now_v7();
        let from = Uuid::from(input.from_branch);
        let to = Uuid::from(input.to_branch);

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO stock_transfers (id, doc_number, from_branch, to_branch, created_by)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(transfer_id)
        .bind(&doc_number)
        .bind(from)
        .bind(to)
        .bind(input.created_by.map(Uuid::from))
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let product = Uuid::from(line.product_id);
            let consumed = consume_fifo_tx(&mut tx, product, from, line.quantity.value()).await?;
            let unit_cost = consumed.blended_unit_cost(line.quantity.value());

            insert_movement_tx(
                &mut tx,
                product,
                from,
                MovementType::TransferOut,
                line.quantity.value(),
                unit_cost.amount(),
                Some(&doc_number),
            )
            .await?;

            insert_batch_tx(
                &mut tx,
                &NewBatch {
                    product_id: line.product_id,
                    branch_id: input.to_branch,
                    quantity: line.quantity,
                    unit_cost,
                    sell_price: line.sell_price.unwrap_or(unit_cost),
                    batch_number: doc_number.clone(),
                    expiry_date: None,
                    purchase_item_id: None,
                },
            )
            .await?;

            insert_movement_tx(
                &mut tx,
                product,
                to,
                MovementType::TransferIn,
                line.quantity.value(),
                unit_cost.amount(),
                Some(&doc_number),
            )
            .await?;

            let item_id = Uuid::now_v7();
            sqlx::query(
                r#"
                INSERT INTO stock_transfer_items (id, transfer_id, product_id, quantity, unit_cost)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(item_id)
            .bind(transfer_id)
            .bind(product)
            .bind(line.quantity.value())
            .bind(unit_cost.amount())
            .execute(&mut *tx)
            .await?;

            items.push(TransferItem {
                id: item_id.into(),
                product_id: line.product_id,
                quantity: line.quantity,
                unit_cost,
            });
        }
        tx.commit().await?;

        Ok(StockTransfer {
            id: transfer_id.into(),
            doc_number,
            from_branch: input.from_branch,
            to_branch: input.to_branch,
            items,
            created_by: input.created_by,
            created_at: Utc::now(),
        })
    }

    async fn blended_cost_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        branch_id: Uuid,
    ) -> Result<Money, DatabaseError> {
        let row: Option<(Decimal, Decimal)> = sqlx::query_as(
            r#"
            SELECT SUM(quantity_remaining * unit_cost), SUM(quantity_remaining)
            FROM stock_batches
            WHERE product_id = $1 AND branch_id = $2 AND quantity_remaining > 0
            GROUP BY product_id
            "#,
        )
        .bind(product_id)
        .bind(branch_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(match row {
            Some((value, qty)) if qty > Decimal::ZERO => Money::new(value / qty),
            _ => Money::ZERO,
        })
    }
}
