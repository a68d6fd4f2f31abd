//! Sales repository
//!
//! The transactional mirror of the sales desk: each operation runs inside
//! one `pool.begin()` transaction, so stock, balances, ledger entries, and
//! loyalty either all commit or none do. Batch and balance rows are locked
//! `FOR UPDATE` where a check precedes a write.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use core_kernel::{
    document::{self, prefix},
    AuditAction, AuditSink, BranchScope, Money, NoopAuditSink, Quantity,
};
use domain_billing::{points_for, InvoiceTotals, SalesInvoiceStatus};
use domain_inventory::{MovementType, NewBatch};
use domain_sales::{
    AddSalesPayment, CreateSalesInvoice, CreateSalesReturn, ReturnItem, ReturnLine, SalesInvoice,
    SalesItem, SalesPayment, SalesReturn,
};

use crate::error::DatabaseError;
use crate::repositories::audit_event;
use crate::repositories::inventory::{consume_fifo_tx, insert_batch_tx, insert_movement_tx};
use crate::repositories::treasury::{credit_account_tx, debit_account_tx, payment_method_str};

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    doc_number: String,
    branch_id: Uuid,
    customer_id: Option<Uuid>,
    subtotal: Decimal,
    discount: Decimal,
    tax: Decimal,
    total: Decimal,
    paid: Decimal,
    returned_total: Decimal,
}

impl InvoiceRow {
    fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::compute(
            Money::new(self.subtotal),
            Money::new(self.discount),
            Money::new(self.tax),
            Money::new(self.paid),
        )
    }

    fn effective_due(&self) -> Money {
        (Money::new(self.total) - Money::new(self.returned_total) - Money::new(self.paid))
            .max_zero()
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    product_id: Uuid,
    quantity: Decimal,
    unit_price: Decimal,
    cost_of_goods: Decimal,
}

fn status_str(status: SalesInvoiceStatus) -> &'static str {
    match status {
        SalesInvoiceStatus::Paid => "PAID",
        SalesInvoiceStatus::Partial => "PARTIAL",
        SalesInvoiceStatus::Unpaid => "UNPAID",
    }
}

fn derive_status(effective_total: Money, paid: Money) -> SalesInvoiceStatus {
    if effective_total.is_positive() && (effective_total - paid).max_zero().is_zero() {
        SalesInvoiceStatus::Paid
    } else if paid.is_positive() {
        SalesInvoiceStatus::Partial
    } else {
        SalesInvoiceStatus::Unpaid
    }
}

/// Repository executing sales operations transactionally.
#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
    audit: Arc<dyn AuditSink>,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_audit(pool, Arc::new(NoopAuditSink))
    }

    pub fn with_audit(pool: PgPool, audit: Arc<dyn AuditSink>) -> Self {
        Self { pool, audit }
    }

    /// Creates a sales invoice in one transaction.
    pub async fn create_invoice(
        &self,
        input: &CreateSalesInvoice,
    ) -> Result<SalesInvoice, DatabaseError> {
        if input.lines.is_empty() {
            return Err(DatabaseError::validation("invoice requires at least one line"));
        }
        if input.discount.is_negative() || input.tax.is_negative() {
            return Err(DatabaseError::validation("discount and tax must not be negative"));
        }

        let branch = Uuid::from(input.branch_id);
        let mut tx = self.pool.begin().await?;

        // Price the lines from the catalog.
        let mut priced: Vec<(Uuid, Quantity, Money, Money)> = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            if !line.quantity.is_positive() {
                return Err(DatabaseError::validation("line quantity must be positive"));
            }
            let product = Uuid::from(line.product_id);
            let row: Option<(Decimal, bool, Option<Uuid>)> = sqlx::query_as(
                "SELECT sell_price, active, branch_id FROM products WHERE id = $1",
            )
            .bind(product)
            .fetch_optional(&mut *tx)
            .await?;
            let (sell_price, active, product_branch) =
                row.ok_or_else(|| DatabaseError::not_found("product", product))?;
            if product_branch.is_some_and(|b| b != branch) {
                return Err(DatabaseError::not_found("product", product));
            }
            if !active {
                return Err(DatabaseError::validation("product is inactive"));
            }
            let unit_price = line.unit_price.unwrap_or(Money::new(sell_price));
            if unit_price.is_negative() {
                return Err(DatabaseError::validation("unit price must not be negative"));
            }
            if line.discount.is_negative() {
                return Err(DatabaseError::validation("line discount must not be negative"));
            }
            let gross = line.quantity.times_cost(unit_price);
            if line.discount > gross {
                return Err(DatabaseError::validation(format!(
                    "line discount {} exceeds the line amount {gross}",
                    line.discount
                )));
            }
            priced.push((product, line.quantity, unit_price, line.discount));
        }

        let subtotal: Money = priced
            .iter()
            .map(|(_, qty, price, discount)| qty.times_cost(*price) - *discount)
            .sum();
        let totals = InvoiceTotals::compute(subtotal, input.discount, input.tax, input.paid_amount);

        let customer = input.customer_id.map(Uuid::from);
        if let Some(customer) = customer {
            let row: Option<Option<Uuid>> =
                sqlx::query_scalar("SELECT branch_id FROM customers WHERE id = $1")
                    .bind(customer)
                    .fetch_optional(&mut *tx)
                    .await?;
            let customer_branch =
                row.ok_or_else(|| DatabaseError::not_found("customer", customer))?;
            if customer_branch.is_some_and(|b| b != branch) {
                return Err(DatabaseError::not_found("customer", customer));
            }
        }

        let doc_number = document::doc_number(prefix::SALES_INVOICE);
        let invoice_id = Uuid::now_v7();
        sqlx::query(
            r#"
            INSERT INTO sales_invoices (
                id, doc_number, branch_id, customer_id, subtotal, discount, tax,
                total, paid, due, status, returned_total, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, $12)
            "#,
        )
        .bind(invoice_id)
        .bind(&doc_number)
        .bind(branch)
        .bind(customer)
        .bind(totals.subtotal.amount())
        .bind(totals.discount.amount())
        .bind(totals.tax.amount())
        .bind(totals.total.amount())
        .bind(totals.paid.amount())
        .bind(totals.due.amount())
        .bind(status_str(totals.sales_status()))
        .bind(input.created_by.map(Uuid::from))
        .execute(&mut *tx)
        .await?;

        // Consume stock FIFO per line and persist the costed items.
        let mut items = Vec::with_capacity(priced.len());
        for (product, quantity, unit_price, discount) in &priced {
            let consumed = consume_fifo_tx(&mut tx, *product, branch, quantity.value()).await?;
            insert_movement_tx(
                &mut tx,
                *product,
                branch,
                MovementType::Sale,
                quantity.value(),
                consumed.blended_unit_cost(quantity.value()).amount(),
                Some(&doc_number),
            )
            .await?;

            let item_id = Uuid::now_v7();
            let line_total = quantity.times_cost(*unit_price) - *discount;
            sqlx::query(
                r#"
                INSERT INTO sales_items (id, invoice_id, product_id, quantity, unit_price, discount, line_total, cost_of_goods)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item_id)
            .bind(invoice_id)
            .bind(*product)
            .bind(quantity.value())
            .bind(unit_price.amount())
            .bind(discount.amount())
            .bind(line_total.amount())
            .bind(consumed.cost_of_goods.amount())
            .execute(&mut *tx)
            .await?;

            items.push(SalesItem {
                id: item_id.into(),
                product_id: (*product).into(),
                quantity: *quantity,
                unit_price: *unit_price,
                discount: *discount,
                line_total,
                cost_of_goods: consumed.cost_of_goods,
            });
        }

        if totals.paid.is_positive() {
            credit_account_tx(&mut tx, branch, input.payment_method.account(), totals.paid)
                .await?;
            sqlx::query(
                r#"
                INSERT INTO sales_payments (id, invoice_id, amount, payment_method, created_by)
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

        if let Some(customer) = customer {
            if totals.due.is_positive() {
                insert_ledger_entry_tx(&mut tx, customer, "DEBIT", totals.due, &doc_number)
                    .await?;
            }
            award_loyalty_tx(&mut tx, customer, totals.total, &doc_number).await?;
        }

        tx.commit().await?;

        self.audit
            .record(audit_event(
                AuditAction::Create,
                "sales_invoice",
                invoice_id,
                input.created_by,
                serde_json::json!({ "doc_number": doc_number, "total": totals.total }),
            ))
            .await;
        tracing::info!(doc_number = %doc_number, total = %totals.total, "sales invoice created");

        Ok(SalesInvoice {
            id: invoice_id.into(),
            doc_number,
            branch_id: input.branch_id,
            customer_id: input.customer_id,
            items,
            totals,
            status: totals.sales_status(),
            returned_total: Money::ZERO,
            created_by: input.created_by,
            created_at: Utc::now(),
        })
    }

    /// Settles part of an invoice's outstanding balance in one transaction.
    pub async fn add_payment(
        &self,
        scope: BranchScope,
        input: &AddSalesPayment,
    ) -> Result<SalesPayment, DatabaseError> {
        if !input.amount.is_positive() {
            return Err(DatabaseError::validation("payment amount must be positive"));
        }

        let invoice_id = Uuid::from(input.invoice_id);
        let mut tx = self.pool.begin().await?;
        let row: InvoiceRow = sqlx::query_as(
            r#"
            SELECT doc_number, branch_id, customer_id, subtotal, discount, tax,
                   total, paid, returned_total
            FROM sales_invoices WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("sales invoice", invoice_id))?;

        if !scope.permits(row.branch_id.into()) {
            return Err(DatabaseError::not_found("sales invoice", invoice_id));
        }
        let due = row.effective_due();
        if due.is_zero() {
            return Err(DatabaseError::validation(format!(
                "invoice {} is already settled",
                row.doc_number
            )));
        }
        if input.amount > due {
            return Err(DatabaseError::validation(format!(
                "payment {} exceeds amount due {due}",
                input.amount
            )));
        }

        credit_account_tx(
            &mut tx,
            row.branch_id,
            input.payment_method.account(),
            input.amount,
        )
        .await?;

        let new_totals = row.totals().with_paid(Money::new(row.paid) + input.amount);
        let status = derive_status(
            (Money::new(row.total) - Money::new(row.returned_total)).max_zero(),
            new_totals.paid,
        );
        sqlx::query(
            "UPDATE sales_invoices SET paid = $2, due = $3, status = $4 WHERE id = $1",
        )
        .bind(invoice_id)
        .bind(new_totals.paid.amount())
        .bind(new_totals.due.amount())
        .bind(status_str(status))
        .execute(&mut *tx)
        .await?;

        if let Some(customer) = row.customer_id {
            insert_ledger_entry_tx(&mut tx, customer, "CREDIT", input.amount, &row.doc_number)
                .await?;
        }

        let payment_id = Uuid::now_v7();
        sqlx::query(
            r#"
            INSERT INTO sales_payments (id, invoice_id, amount, payment_method, created_by)
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
                "sales_payment",
                payment_id,
                input.created_by,
                serde_json::json!({ "doc_number": row.doc_number, "amount": input.amount }),
            ))
            .await;

        Ok(SalesPayment {
            id: payment_id.into(),
            invoice_id: input.invoice_id,
            amount: input.amount,
            payment_method: input.payment_method,
            created_by: input.created_by,
            received_at: Utc::now(),
        })
    }

    /// Processes a return against an invoice in one transaction.
    pub async fn process_return(
        &self,
        scope: BranchScope,
        input: &CreateSalesReturn,
    ) -> Result<SalesReturn, DatabaseError> {
        if input.lines.is_empty() {
            return Err(DatabaseError::validation("return requires at least one line"));
        }
        if input.refund_requested.is_some_and(|r| r.is_negative()) {
            return Err(DatabaseError::validation("requested refund must not be negative"));
        }

        let invoice_id = Uuid::from(input.invoice_id);
        let mut tx = self.pool.begin().await?;
        let row: InvoiceRow = sqlx::query_as(
            r#"
            SELECT doc_number, branch_id, customer_id, subtotal, discount, tax,
                   total, paid, returned_total
            FROM sales_invoices WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::not_found("sales invoice", invoice_id))?;
        if !scope.permits(row.branch_id.into()) {
            return Err(DatabaseError::not_found("sales invoice", invoice_id));
        }

        // Resolve every line to an invoice line, then fold duplicates so the
        // per-line cap sees each line's combined quantity.
        let mut requested = fold_return_lines(&input.lines);
        for line in &input.lines {
            if !line.quantity.is_positive() {
                return Err(DatabaseError::validation("return quantity must be positive"));
            }
            if line.sales_item_id.is_some() {
                continue;
            }
            let Some(product_id) = line.product_id else {
                return Err(DatabaseError::validation(
                    "return line names neither an invoice line nor a product",
                ));
            };
            let product = Uuid::from(product_id);
            let item_id: Option<Uuid> = sqlx::query_scalar(
                "SELECT id FROM sales_items WHERE invoice_id = $1 AND product_id = $2 ORDER BY id LIMIT 1",
            )
            .bind(invoice_id)
            .bind(product)
            .fetch_optional(&mut *tx)
            .await?;
            let item_id =
                item_id.ok_or_else(|| DatabaseError::not_found("invoice line", product))?;
            *requested.entry(item_id).or_insert(Quantity::ZERO) += line.quantity;
        }

        let mut return_total = Money::ZERO;
        let mut pending: Vec<(ItemRow, Quantity, Money, Money)> = Vec::new();
        for (item_id, quantity) in requested {
            let item: ItemRow = sqlx::query_as(
                r#"
                SELECT id, product_id, quantity, unit_price, cost_of_goods
                FROM sales_items WHERE id = $1 AND invoice_id = $2
                "#,
            )
            .bind(item_id)
            .bind(invoice_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("invoice line", item_id))?;

            let already: Decimal = sqlx::query_scalar(
                "SELECT COALESCE(SUM(quantity), 0) FROM sales_return_items WHERE sales_item_id = $1",
            )
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;
            let returnable = Quantity::new((item.quantity - already).max(Decimal::ZERO));
            if quantity > returnable {
                return Err(DatabaseError::validation(format!(
                    "return of {} exceeds the {} still returnable on line {}",
                    quantity, returnable, item_id
                )));
            }

            let unit_price = Money::new(item.unit_price);
            let line_total = quantity.times_cost(unit_price);
            return_total += line_total;
            // Restock at the cost the units originally left at.
            let unit_cost = if item.quantity > Decimal::ZERO {
                Money::new(item.cost_of_goods / item.quantity)
            } else {
                Money::ZERO
            };
            pending.push((item, quantity, unit_cost, line_total));
        }

        let refund = input
            .refund_requested
            .unwrap_or(return_total)
            .min(return_total)
            .min(Money::new(row.paid));

        if refund.is_positive() {
            debit_account_tx(
                &mut tx,
                row.branch_id,
                input.refund_method.account(),
                refund,
                "sales refund",
            )
            .await?;
        }

        let doc_number = document::doc_number(prefix::SALES_RETURN);
        let return_id = Uuid::now_v7();
        let ledger_credit = (return_total - refund).max_zero();
        sqlx::query(
            r#"
            INSERT INTO sales_returns (
                id, doc_number, invoice_id, return_total, refund, refund_method,
                ledger_credit, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(return_id)
        .bind(&doc_number)
        .bind(invoice_id)
        .bind(return_total.amount())
        .bind(refund.amount())
        .bind(payment_method_str(input.refund_method))
        .bind(ledger_credit.amount())
        .bind(input.created_by.map(Uuid::from))
        .execute(&mut *tx)
        .await?;

        let restock_batch = format!("RET-{}", row.doc_number);
        let mut items = Vec::with_capacity(pending.len());
        for (item, quantity, unit_cost, line_total) in pending {
            insert_batch_tx(
                &mut tx,
                &NewBatch {
                    product_id: item.product_id.into(),
                    branch_id: row.branch_id.into(),
                    quantity,
                    unit_cost,
                    sell_price: Money::new(item.unit_price),
                    batch_number: restock_batch.clone(),
                    expiry_date: None,
                    purchase_item_id: None,
                },
            )
            .await?;
            insert_movement_tx(
                &mut tx,
                item.product_id,
                row.branch_id,
                MovementType::Return,
                quantity.value(),
                unit_cost.amount(),
                Some(&doc_number),
            )
            .await?;

            let return_item_id = Uuid::now_v7();
            sqlx::query(
                r#"
                INSERT INTO sales_return_items (id, return_id, sales_item_id, product_id, quantity, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(return_item_id)
            .bind(return_id)
            .bind(item.id)
            .bind(item.product_id)
            .bind(quantity.value())
            .bind(item.unit_price)
            .bind(line_total.amount())
            .execute(&mut *tx)
            .await?;

            items.push(ReturnItem {
                id: return_item_id.into(),
                sales_item_id: item.id.into(),
                product_id: item.product_id.into(),
                quantity,
                unit_price: Money::new(item.unit_price),
                line_total,
            });
        }

        if let Some(customer) = row.customer_id {
            if ledger_credit.is_positive() {
                insert_ledger_entry_tx(&mut tx, customer, "CREDIT", ledger_credit, &doc_number)
                    .await?;
            }
            reverse_loyalty_tx(&mut tx, customer, return_total, &doc_number).await?;
        }

        let new_paid = (Money::new(row.paid) - refund).max_zero();
        let new_returned = Money::new(row.returned_total) + return_total;
        let effective_total = (Money::new(row.total) - new_returned).max_zero();
        let status = derive_status(effective_total, new_paid);
        sqlx::query(
            r#"
            UPDATE sales_invoices
            SET paid = $2, due = $3, returned_total = $4, status = $5
            WHERE id = $1
            "#,
        )
        .bind(invoice_id)
        .bind(new_paid.amount())
        .bind((effective_total - new_paid).max_zero().amount())
        .bind(new_returned.amount())
        .bind(status_str(status))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.audit
            .record(audit_event(
                AuditAction::Create,
                "sales_return",
                return_id,
                input.created_by,
                serde_json::json!({
                    "doc_number": doc_number,
                    "return_total": return_total,
                    "refund": refund,
                }),
            ))
            .await;
        tracing::info!(doc_number = %doc_number, return_total = %return_total, refund = %refund, "sales return processed");

        Ok(SalesReturn {
            id: return_id.into(),
            doc_number,
            invoice_id: input.invoice_id,
            items,
            return_total,
            refund,
            refund_method: input.refund_method,
            ledger_credit,
            created_by: input.created_by,
            created_at: Utc::now(),
        })
    }
}

/// Sums the explicitly line-addressed entries of a return request by
/// invoice line, so duplicates face the returnable cap as one quantity.
fn fold_return_lines(lines: &[ReturnLine]) -> HashMap<Uuid, Quantity> {
    let mut requested: HashMap<Uuid, Quantity> = HashMap::new();
    for line in lines {
        if let Some(id) = line.sales_item_id {
            *requested.entry(Uuid::from(id)).or_insert(Quantity::ZERO) += line.quantity;
        }
    }
    requested
}

async fn insert_ledger_entry_tx(
    tx: &mut Transaction<'_, Postgres>,
    customer_id: Uuid,
    entry_type: &str,
    amount: Money,
    reference: &str,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO customer_ledger (id, customer_id, entry_type, amount, reference)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(customer_id)
    .bind(entry_type)
    .bind(amount.amount())
    .bind(reference)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn award_loyalty_tx(
    tx: &mut Transaction<'_, Postgres>,
    customer_id: Uuid,
    invoice_total: Money,
    reference: &str,
) -> Result<(), DatabaseError> {
    let points = points_for(invoice_total);
    if points == 0 {
        return Ok(());
    }
    sqlx::query("UPDATE customers SET loyalty_points = loyalty_points + $2 WHERE id = $1")
        .bind(customer_id)
        .bind(points)
        .execute(&mut **tx)
        .await?;
    insert_loyalty_tx(tx, customer_id, "EARN", points, reference).await
}

async fn reverse_loyalty_tx(
    tx: &mut Transaction<'_, Postgres>,
    customer_id: Uuid,
    return_total: Money,
    reference: &str,
) -> Result<(), DatabaseError> {
    let wanted = points_for(return_total);
    if wanted == 0 {
        return Ok(());
    }
    let balance: i64 =
        sqlx::query_scalar("SELECT loyalty_points FROM customers WHERE id = $1 FOR UPDATE")
            .bind(customer_id)
            .fetch_one(&mut **tx)
            .await?;
    let points = wanted.min(balance);
    if points == 0 {
        return Ok(());
    }
    sqlx::query("UPDATE customers SET loyalty_points = loyalty_points - $2 WHERE id = $1")
        .bind(customer_id)
        .bind(points)
        .execute(&mut **tx)
        .await?;
    insert_loyalty_tx(tx, customer_id, "REVERSAL", points, reference).await
}

async fn insert_loyalty_tx(
    tx: &mut Transaction<'_, Postgres>,
    customer_id: Uuid,
    tx_type: &str,
    points: i64,
    reference: &str,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO loyalty_transactions (id, customer_id, tx_type, points, reference)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(customer_id)
    .bind(tx_type)
    .bind(points)
    .bind(reference)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::SalesItemId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_duplicate_return_lines_fold_into_one_quantity() {
        let item = SalesItemId::new();
        let lines = vec![
            ReturnLine::for_item(item, Quantity::new(dec!(6))),
            ReturnLine::for_item(item, Quantity::new(dec!(6))),
        ];

        let requested = fold_return_lines(&lines);
        assert_eq!(requested.len(), 1);
        // Both lines face the returnable cap as a single 12-unit request.
        assert_eq!(requested[&Uuid::from(item)], Quantity::new(dec!(12)));
    }

    #[test]
    fn test_product_only_lines_are_left_for_resolution() {
        let item = SalesItemId::new();
        let lines = vec![
            ReturnLine::for_item(item, Quantity::new(dec!(2))),
            ReturnLine::for_product(core_kernel::ProductId::new(), Quantity::new(dec!(3))),
        ];

        let requested = fold_return_lines(&lines);
        assert_eq!(requested.len(), 1);
        assert_eq!(requested[&Uuid::from(item)], Quantity::new(dec!(2)));
    }

    #[test]
    fn test_audit_event_carries_actor_and_entity() {
        let user = core_kernel::UserId::new();
        let entity = Uuid::now_v7();
        let event = audit_event(
            AuditAction::Create,
            "sales_invoice",
            entity,
            Some(user),
            serde_json::json!({ "total": Money::new(dec!(95)) }),
        );

        assert_eq!(event.action, AuditAction::Create);
        assert_eq!(event.entity_type, "sales_invoice");
        assert_eq!(event.entity_id, Some(entity));
        assert_eq!(event.user_id, Some(user));

        let anonymous = audit_event(
            AuditAction::Create,
            "sales_payment",
            entity,
            None,
            serde_json::json!({}),
        );
        assert_eq!(anonymous.user_id, None);
    }
}
