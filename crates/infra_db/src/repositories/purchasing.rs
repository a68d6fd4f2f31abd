//! Purchasing repository
//!
//! Goods receipt and supplier payments on PostgreSQL. A purchase either
//! lands completely (batches, movements, invoice rows, payment) or not at
//! all; the supplier cannot be overpaid at creation or settlement.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use core_kernel::{
    document::{self, prefix},
    AuditAction, AuditSink, BranchScope, Money, NoopAuditSink,
};
use domain_billing::{InvoiceTotals, PurchaseInvoiceStatus};
use domain_inventory::{MovementType, NewBatch};
use domain_purchasing::{
    AddSupplierPayment, CreatePurchaseInvoice, PurchaseInvoice, PurchaseItem, SupplierPayment,
};

use crate::error::DatabaseError;
use crate::repositories::audit_event;
use crate::repositories::inventory::{insert_batch_tx, insert_movement_tx};
use crate::repositories::treasury::{debit_account_tx, payment_method_str};

fn status_str(status: PurchaseInvoiceStatus) -> &'static str {
    match status {
        PurchaseInvoiceStatus::Received => "RECEIVED",
        PurchaseInvoiceStatus::Partial => "PARTIAL",
        PurchaseInvoiceStatus::Ordered => "ORDERED",
    }
}

/// Repository executing purchasing operations transactionally.
#[derive(Clone)]
pub struct PurchasingRepository {
    pool: PgPool,
    audit: Arc<dyn AuditSink>,
}

impl PurchasingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_audit(pool, Arc::new(NoopAuditSink))
    }

    pub fn with_audit(pool: PgPool, audit: Arc<dyn AuditSink>) -> Self {
        Self { pool, audit }
    }

    /// Records a goods receipt in one transaction.
    pub async fn create_invoice(
        &self,
        input: &CreatePurchaseInvoice,
    ) -> Result<PurchaseInvoice, DatabaseError> {
        if input.lines.is_empty() {
            return Err(DatabaseError::validation("invoice requires at least one line"));
        }
        if input.discount.is_negative() || input.tax.is_negative() {
            return Err(DatabaseError::validation("discount and tax must not be negative"));
        }
        for line in &input.lines {
            if !line.quantity.is_positive() {
                return Err(DatabaseError::validation("line quantity must be positive"));
            }
            if line.unit_cost.is_negative() {
                return Err(DatabaseError::validation("unit cost must not be negative"));
            }
            if line.discount.is_negative() {
                return Err(DatabaseError::validation("line discount must not be negative"));
            }
            let gross = line.quantity.times_cost(line.unit_cost);
            if line.discount > gross {
                return Err(DatabaseError::validation(format!(
                    "line discount {} exceeds the line amount {gross}",
                    line.discount
                )));
            }
        }

        let subtotal: Money = input
            .lines
            .iter()
            .map(|line| line.quantity.times_cost(line.unit_cost) - line.discount)
            .sum();
        let totals = InvoiceTotals::compute(subtotal, input.discount, input.tax, input.paid_amount);
        if input.paid_amount > totals.total {
            return Err(DatabaseError::validation(format!(
                "payment {} exceeds invoice total {}",
                input.paid_amount, totals.total
            )));
        }

        let branch = Uuid::from(input.branch_id);
        let doc_number = document::doc_number(prefix::PURCHASE_INVOICE);
        let invoice_id = Uuid::now_v7();
        let mut tx = self.pool.begin().await?;

        // Pay the supplier before touching stock so an under-funded purchase
        // leaves no batches behind.
        if totals.paid.is_positive() {
            debit_account_tx(
                &mut tx,
                branch,
                input.payment_method.account(),
                totals.paid,
                "supplier payment",
            )
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO purchase_invoices (
                id, doc_number, branch_id, supplier_id, subtotal, discount, tax,
                total, paid, due, status, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(invoice_id)
        .bind(&doc_number)
        .bind(branch)
        .bind(input.supplier_id.map(Uuid::from))
        .bind(totals.subtotal.amount())
        .bind(totals.discount.amount())
        .bind(totals.tax.amount())
        .bind(totals.total.amount())
        .bind(totals.paid.amount())
        .bind(totals.due.amount())
        .bind(status_str(totals.purchase_status()))
        .bind(input.created_by.map(Uuid::from))
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let product = Uuid::from(line.product_id);
            let sell_price: Option<Decimal> =
                sqlx::query_scalar("SELECT sell_price FROM products WHERE id = $1")
                    .bind(product)
                    .fetch_optional(&mut *tx)
                    .await?;
            let sell_price = sell_price
                .map(Money::new)
                .ok_or_else(|| DatabaseError::not_found("product", product))?;
            let sell_price = line.sell_price.unwrap_or(sell_price);

            let item_id = Uuid::now_v7();
            let batch_number = line
                .batch_number
                .clone()
                .unwrap_or_else(|| document::doc_number(prefix::STOCK_BATCH));
            let batch_id = insert_batch_tx(
                &mut tx,
                &NewBatch {
                    product_id: line.product_id,
                    branch_id: input.branch_id,
                    quantity: line.quantity,
                    unit_cost: line.unit_cost,
                    sell_price,
                    batch_number,
                    expiry_date: line.expiry_date,
                    purchase_item_id: Some(item_id.into()),
                },
            )
            .await?;
            insert_movement_tx(
                &mut tx,
                product,
                branch,
                MovementType::Purchase,
                line.quantity.value(),
                line.unit_cost.amount(),
                Some(&doc_number),
            )
            .await?;

            let line_total = line.quantity.times_cost(line.unit_cost) - line.discount;
            sqlx::query(
                r#"
                INSERT INTO purchase_items (id, invoice_id, product_id, quantity, unit_cost, discount, line_total, batch_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item_id)
            .bind(invoice_id)
            .bind(product)
            .bind(line.quantity.value())
            .bind(line.unit_cost.amount())
            .bind(line.discount.amount())
            .bind(line_total.amount())
            .bind(batch_id)
            .execute(&mut *tx)
            .await?;

            items.push(PurchaseItem {
                id: item_id.into(),
                product_id: line.product_id,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                discount: line.discount,
                line_total,
                batch_id: batch_id.into(),
            });
        }

        if totals.paid.is_positive() {
            sqlx::query(
                r#"
                INSERT INTO supplier_payments (id, invoice_id, amount, payment_method, created_by)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(invoice_id)
            .bind(totals.paid.amount())
            .bind(payment_method_str(input.payment_method))
            .bind(input.created_by.map(Uuid::from))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        self.audit
            .record(audit_event(
                AuditAction::Create,
                "purchase_invoice",
                invoice_id,
                input.created_by,
                serde_json::json!({ "doc_number": doc_number, "total": totals.total }),
            ))
            .await;
        tracing::info!(doc_number = %doc_number, total = %totals.total, "purchase invoice created");

        Ok(PurchaseInvoice {
            id: invoice_id.into(),
            doc_number,
            branch_id: input.branch_id,
            supplier_id: input.supplier_id,
            items,
            totals,
            status: totals.purchase_status(),
            created_by: input.created_by,
            created_at: Utc::now(),
        })
    }

    /// Pays down a supplier invoice in one transaction.
    pub async fn add_payment(
        &self,
        scope: BranchScope,
        input: &AddSupplierPayment,
    ) -> Result<SupplierPayment, DatabaseError> {
        if !input.amount.is_positive() {
            return Err(DatabaseError::validation("payment amount must be positive"));
        }

        let invoice_id = Uuid::from(input.invoice_id);
        let mut tx = self.pool.begin().await?;
        let row: Option<(String, Uuid, Decimal, Decimal, Decimal, Decimal, Decimal)> =
            sqlx::query_as(
                r#"
                SELECT doc_number, branch_id, subtotal, discount, tax, total, paid
                FROM purchase_invoices WHERE id = $1 FOR UPDATE
                "#,
            )
            .bind(invoice_id)
            .fetch_optional(&mut *tx)
            .await?;
        let (doc_number, branch, subtotal, discount, tax, total, paid) =
            row.ok_or_else(|| DatabaseError::not_found("purchase invoice", invoice_id))?;
        if !scope.permits(branch.into()) {
            return Err(DatabaseError::not_found("purchase invoice", invoice_id));
        }

        let due = (Money::new(total) - Money::new(paid)).max_zero();
        if due.is_zero() {
            return Err(DatabaseError::validation(format!(
                "invoice {doc_number} is already settled"
            )));
        }
        if input.amount > due {
            return Err(DatabaseError::validation(format!(
                "payment {} exceeds amount due {due}",
                input.amount
            )));
        }

        debit_account_tx(
            &mut tx,
            branch,
            input.payment_method.account(),
            input.amount,
            "supplier payment",
        )
        .await?;

        let totals = InvoiceTotals::compute(
            Money::new(subtotal),
            Money::new(discount),
            Money::new(tax),
            Money::new(paid) + input.amount,
        );
        sqlx::query(
            "UPDATE purchase_invoices SET paid = $2, due = $3, status = $4 WHERE id = $1",
        )
        .bind(invoice_id)
        .bind(totals.paid.amount())
        .bind(totals.due.amount())
        .bind(status_str(totals.purchase_status()))
        .execute(&mut *tx)
        .await?;

        let payment_id = Uuid::now_v7();
        sqlx::query(
            r#"
            INSERT INTO supplier_payments (id, invoice_id, amount, payment_method, created_by)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(payment_id)
        .bind(invoice_id)
        .bind(input.amount.amount())
        .bind(payment_method_str(input.payment_method))
        .bind(input.created_by.map(Uuid::from))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.audit
            .record(audit_event(
                AuditAction::Create,
                "supplier_payment",
                payment_id,
                input.created_by,
                serde_json::json!({ "doc_number": doc_number, "amount": input.amount }),
            ))
            .await;

        Ok(SupplierPayment {
            id: payment_id.into(),
            invoice_id: input.invoice_id,
            amount: input.amount,
            payment_method: input.payment_method,
            created_by: input.created_by,
            paid_at: Utc::now(),
        })
    }
}
