//! Sales desk
//!
//! The desk orchestrates a sale across the other domains: it consumes
//! stock FIFO, derives the invoice totals, settles the initial payment into
//! a branch account, books any unpaid remainder to the customer ledger, and
//! awards loyalty points. Each public operation validates and plans
//! everything before mutating anything, so a failure leaves every store
//! unchanged.

use chrono::Utc;
use std::collections::HashMap;

use core_kernel::{
    document::{self, prefix},
    BranchScope, Money, Quantity, ReturnItemId, SalesInvoiceId, SalesItemId, SalesPaymentId,
    SalesReturnId,
};
use domain_billing::{CustomerDirectory, CustomerLedger, InvoiceTotals};
use domain_inventory::{MovementType, NewBatch, ProductCatalog, StockLedger};
use domain_treasury::{AccountStore, Direction};

use crate::error::SalesError;
use crate::invoice::{
    AddSalesPayment, CreateSalesInvoice, SalesInvoice, SalesItem, SalesPayment,
};
use crate::returns::{CreateSalesReturn, ReturnItem, SalesReturn};

/// In-memory store of invoices, payments, and returns for one company.
#[derive(Debug, Default)]
pub struct SalesDesk {
    invoices: HashMap<SalesInvoiceId, SalesInvoice>,
    payments: Vec<SalesPayment>,
    returns: Vec<SalesReturn>,
}

impl SalesDesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invoice(&self, id: SalesInvoiceId) -> Option<&SalesInvoice> {
        self.invoices.get(&id)
    }

    pub fn invoices(&self) -> impl Iterator<Item = &SalesInvoice> {
        self.invoices.values()
    }

    pub fn returns(&self) -> impl Iterator<Item = &SalesReturn> {
        self.returns.iter()
    }

    pub fn payments_for(&self, invoice_id: SalesInvoiceId) -> Vec<&SalesPayment> {
        self.payments
            .iter()
            .filter(|p| p.invoice_id == invoice_id)
            .collect()
    }

    pub fn returns_for(&self, invoice_id: SalesInvoiceId) -> Vec<&SalesReturn> {
        self.returns
            .iter()
            .filter(|r| r.invoice_id == invoice_id)
            .collect()
    }

    /// Creates a sales invoice.
    ///
    /// Stock for every line is planned before any batch is touched, so a
    /// shortfall on the last line rejects the whole sale. An unpaid balance
    /// is booked to the customer's ledger when one is attached; a walk-in
    /// sale simply keeps its due on the invoice.
    ///
    /// # Errors
    ///
    /// - `InventoryError::InsufficientStock` when a line cannot be covered
    /// - Validation errors for empty lines, non-positive quantities, or
    ///   negative discounts, tax, or prices
    pub fn create_invoice(
        &mut self,
        catalog: &ProductCatalog,
        stock: &mut StockLedger,
        accounts: &mut AccountStore,
        customers: &mut CustomerDirectory,
        ledger: &mut CustomerLedger,
        input: CreateSalesInvoice,
    ) -> Result<SalesInvoice, SalesError> {
        if input.lines.is_empty() {
            return Err(SalesError::validation("invoice requires at least one line"));
        }
        if input.discount.is_negative() {
            return Err(SalesError::validation("discount must not be negative"));
        }
        if input.tax.is_negative() {
            return Err(SalesError::validation("tax must not be negative"));
        }

        // Price every line before anything moves.
        let mut priced: Vec<(Quantity, Money, Money)> = Vec::with_capacity(input.lines.len());
        let mut requests = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            if !line.quantity.is_positive() {
                return Err(SalesError::validation(format!(
                    "line quantity must be positive, got {}",
                    line.quantity
                )));
            }
            let product = catalog.expect_sellable(line.product_id, input.branch_id)?;
            let unit_price = line.unit_price.unwrap_or(product.sell_price);
            if unit_price.is_negative() {
                return Err(SalesError::validation("unit price must not be negative"));
            }
            if line.discount.is_negative() {
                return Err(SalesError::validation("line discount must not be negative"));
            }
            let gross = line.quantity.times_cost(unit_price);
            if line.discount > gross {
                return Err(SalesError::validation(format!(
                    "line discount {} exceeds the line amount {gross}",
                    line.discount
                )));
            }
            priced.push((line.quantity, unit_price, line.discount));
            requests.push((line.product_id, line.quantity));
        }

        let plans = stock.plan_many(input.branch_id, &requests)?;

        let subtotal: Money = priced
            .iter()
            .map(|(qty, price, discount)| qty.times_cost(*price) - *discount)
            .sum();
        let totals = InvoiceTotals::compute(subtotal, input.discount, input.tax, input.paid_amount);

        if let Some(customer_id) = input.customer_id {
            customers.expect_at(customer_id, input.branch_id)?;
        }

        // All checks passed; from here every step succeeds.
        let doc_number = document::doc_number(prefix::SALES_INVOICE);
        let mut items = Vec::with_capacity(input.lines.len());
        for ((line, (quantity, unit_price, discount)), plan) in
            input.lines.iter().zip(priced.iter()).zip(plans.iter())
        {
            stock.apply_plan(plan)?;
            stock.record_movement(
                line.product_id,
                input.branch_id,
                MovementType::Sale,
                *quantity,
                plan.blended_unit_cost(),
                Some(doc_number.clone()),
            );
            items.push(SalesItem {
                id: SalesItemId::new_v7(),
                product_id: line.product_id,
                quantity: *quantity,
                unit_price: *unit_price,
                discount: *discount,
                line_total: quantity.times_cost(*unit_price) - *discount,
                cost_of_goods: plan.cost_of_goods,
            });
        }

        let invoice_id = SalesInvoiceId::new_v7();
        if totals.paid.is_positive() {
            accounts.apply_movement(
                input.branch_id,
                input.payment_method.account(),
                Direction::In,
                totals.paid,
                "sales payment",
            )?;
            self.payments.push(SalesPayment {
                id: SalesPaymentId::new_v7(),
                invoice_id,
                amount: totals.paid,
                payment_method: input.payment_method,
                created_by: input.created_by,
                received_at: Utc::now(),
            });
        }

        if let Some(customer_id) = input.customer_id {
            if totals.due.is_positive() {
                ledger.debit(customer_id, totals.due, &doc_number)?;
            }
            customers.award_loyalty(customer_id, totals.total, &doc_number)?;
        }

        let mut invoice = SalesInvoice {
            id: invoice_id,
            doc_number: doc_number.clone(),
            branch_id: input.branch_id,
            customer_id: input.customer_id,
            items,
            totals,
            status: totals.sales_status(),
            returned_total: Money::ZERO,
            created_by: input.created_by,
            created_at: Utc::now(),
        };
        invoice.refresh_status();

        tracing::info!(
            doc_number = %doc_number,
            branch = %input.branch_id,
            total = %totals.total,
            paid = %totals.paid,
            status = ?invoice.status,
            "sales invoice created"
        );

        self.invoices.insert(invoice_id, invoice.clone());
        Ok(invoice)
    }

    /// Settles part of an invoice's outstanding balance.
    ///
    /// # Errors
    ///
    /// - Not found when the invoice does not exist or the scope does not
    ///   cover its branch
    /// - Validation when the invoice is already settled or the amount is
    ///   non-positive or exceeds what is due
    pub fn add_payment(
        &mut self,
        accounts: &mut AccountStore,
        ledger: &mut CustomerLedger,
        scope: BranchScope,
        input: AddSalesPayment,
    ) -> Result<SalesPayment, SalesError> {
        let invoice = self
            .invoices
            .get(&input.invoice_id)
            .ok_or_else(|| SalesError::not_found(format!("sales invoice {}", input.invoice_id)))?;
        scope.check(invoice.branch_id, "sales invoice")?;

        if !input.amount.is_positive() {
            return Err(SalesError::validation("payment amount must be positive"));
        }
        let due = invoice.due();
        if due.is_zero() {
            return Err(SalesError::validation(format!(
                "invoice {} is already settled",
                invoice.doc_number
            )));
        }
        if input.amount > due {
            return Err(SalesError::validation(format!(
                "payment {} exceeds amount due {due}",
                input.amount
            )));
        }

        let branch_id = invoice.branch_id;
        let customer_id = invoice.customer_id;
        let doc_number = invoice.doc_number.clone();

        accounts.apply_movement(
            branch_id,
            input.payment_method.account(),
            Direction::In,
            input.amount,
            "sales payment",
        )?;

        if let Some(customer_id) = customer_id {
            ledger.credit(customer_id, input.amount, &doc_number)?;
        }

        let invoice = self.invoices.get_mut(&input.invoice_id).unwrap();
        invoice.totals = invoice.totals.with_paid(invoice.totals.paid + input.amount);
        invoice.refresh_status();

        let payment = SalesPayment {
            id: SalesPaymentId::new_v7(),
            invoice_id: input.invoice_id,
            amount: input.amount,
            payment_method: input.payment_method,
            created_by: input.created_by,
            received_at: Utc::now(),
        };
        self.payments.push(payment.clone());
        Ok(payment)
    }

    /// Quantity already returned against one invoice line.
    fn returned_quantity(&self, sales_item_id: SalesItemId) -> Quantity {
        self.returns
            .iter()
            .flat_map(|r| r.items.iter())
            .filter(|item| item.sales_item_id == sales_item_id)
            .map(|item| item.quantity)
            .sum()
    }

    /// Returns goods against an invoice.
    ///
    /// Each line may return at most what its invoice line sold minus what
    /// earlier returns already took back. Returned units go back into stock
    /// at the cost they originally left at. The cash refund is capped at
    /// both the return's value and what the customer has actually paid;
    /// any remainder is credited to their ledger.
    ///
    /// # Errors
    ///
    /// - Not found for unknown invoices or lines, or out-of-scope branches
    /// - Validation for empty or over-quantity lines
    /// - `TreasuryError::InsufficientFunds` when the refund account cannot
    ///   cover the cash refund
    pub fn process_return(
        &mut self,
        stock: &mut StockLedger,
        accounts: &mut AccountStore,
        customers: &mut CustomerDirectory,
        ledger: &mut CustomerLedger,
        scope: BranchScope,
        input: CreateSalesReturn,
    ) -> Result<SalesReturn, SalesError> {
        let invoice = self
            .invoices
            .get(&input.invoice_id)
            .ok_or_else(|| SalesError::not_found(format!("sales invoice {}", input.invoice_id)))?;
        scope.check(invoice.branch_id, "sales invoice")?;

        if input.lines.is_empty() {
            return Err(SalesError::validation("return requires at least one line"));
        }
        if let Some(requested) = input.refund_requested {
            if requested.is_negative() {
                return Err(SalesError::validation("requested refund must not be negative"));
            }
        }

        // Resolve every line to an invoice line, then fold duplicates so
        // two half-quantity lines cannot slip past the per-line cap.
        let mut requested_per_item: HashMap<SalesItemId, Quantity> = HashMap::new();
        for line in &input.lines {
            if !line.quantity.is_positive() {
                return Err(SalesError::validation(format!(
                    "return quantity must be positive, got {}",
                    line.quantity
                )));
            }
            let sales_item_id = match (line.sales_item_id, line.product_id) {
                (Some(id), _) => id,
                (None, Some(product_id)) => invoice
                    .items
                    .iter()
                    .find(|i| i.product_id == product_id)
                    .map(|i| i.id)
                    .ok_or_else(|| {
                        SalesError::not_found(format!(
                            "invoice line selling product {product_id}"
                        ))
                    })?,
                (None, None) => {
                    return Err(SalesError::validation(
                        "return line names neither an invoice line nor a product",
                    ))
                }
            };
            *requested_per_item
                .entry(sales_item_id)
                .or_insert(Quantity::ZERO) += line.quantity;
        }

        let branch_id = invoice.branch_id;
        let customer_id = invoice.customer_id;
        let invoice_doc = invoice.doc_number.clone();
        let paid_so_far = invoice.totals.paid;

        let mut items = Vec::with_capacity(requested_per_item.len());
        let mut return_total = Money::ZERO;
        let mut restocks = Vec::with_capacity(requested_per_item.len());
        for (sales_item_id, quantity) in requested_per_item {
            let sold = invoice.item(sales_item_id).ok_or_else(|| {
                SalesError::not_found(format!("invoice line {sales_item_id}"))
            })?;
            let returnable = (sold.quantity - self.returned_quantity(sales_item_id)).max_zero();
            if quantity > returnable {
                return Err(SalesError::validation(format!(
                    "return of {} exceeds the {} still returnable on line {}",
                    quantity, returnable, sales_item_id
                )));
            }

            let line_total = quantity.times_cost(sold.unit_price);
            return_total += line_total;

            // Restock at the cost the units originally left at.
            let unit_cost = if sold.quantity.is_positive() {
                Money::new(sold.cost_of_goods.amount() / sold.quantity.value())
            } else {
                Money::ZERO
            };
            restocks.push((sold.product_id, quantity, unit_cost, sold.unit_price));

            items.push(ReturnItem {
                id: ReturnItemId::new_v7(),
                sales_item_id,
                product_id: sold.product_id,
                quantity,
                unit_price: sold.unit_price,
                line_total,
            });
        }

        let refund = input
            .refund_requested
            .unwrap_or(return_total)
            .min(return_total)
            .min(paid_so_far);

        // Funds check happens before any stock moves back in.
        if refund.is_positive() {
            accounts.ensure_funds(
                branch_id,
                input.refund_method.account(),
                refund,
                "sales refund",
            )?;
        }

        let doc_number = document::doc_number(prefix::SALES_RETURN);
        let restock_batch = format!("RET-{invoice_doc}");
        for (product_id, quantity, unit_cost, sell_price) in restocks {
            stock.receive_batch(NewBatch {
                product_id,
                branch_id,
                quantity,
                unit_cost,
                sell_price,
                batch_number: restock_batch.clone(),
                expiry_date: None,
                purchase_item_id: None,
            })?;
            stock.record_movement(
                product_id,
                branch_id,
                MovementType::Return,
                quantity,
                unit_cost,
                Some(doc_number.clone()),
            );
        }

        if refund.is_positive() {
            accounts.apply_movement(
                branch_id,
                input.refund_method.account(),
                Direction::Out,
                refund,
                "sales refund",
            )?;
        }

        let ledger_credit = (return_total - refund).max_zero();
        if let Some(customer_id) = customer_id {
            if ledger_credit.is_positive() {
                ledger.credit(customer_id, ledger_credit, &doc_number)?;
            }
            customers.reverse_loyalty(customer_id, return_total, &doc_number)?;
        }

        let invoice = self.invoices.get_mut(&input.invoice_id).unwrap();
        invoice.returned_total += return_total;
        invoice.totals = invoice.totals.with_paid(paid_so_far - refund);
        invoice.refresh_status();

        tracing::info!(
            doc_number = %doc_number,
            invoice = %invoice_doc,
            return_total = %return_total,
            refund = %refund,
            "sales return processed"
        );

        let sales_return = SalesReturn {
            id: SalesReturnId::new_v7(),
            doc_number,
            invoice_id: input.invoice_id,
            items,
            return_total,
            refund,
            refund_method: input.refund_method,
            ledger_credit,
            created_by: input.created_by,
            created_at: Utc::now(),
        };
        self.returns.push(sales_return.clone());
        Ok(sales_return)
    }
}
