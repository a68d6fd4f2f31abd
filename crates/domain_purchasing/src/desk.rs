//! Purchase desk
//!
//! Recording a purchase receives one stock batch per line at the supplier's
//! unit cost and settles any up-front payment out of a branch account. The
//! funds check runs before any batch lands, so an underfunded payment
//! leaves stock untouched.
//!
//! Unlike sales, an offered payment above the invoice total is rejected
//! outright rather than clamped; paying a supplier more than invoiced is
//! almost always a data-entry error.

use chrono::Utc;
use std::collections::HashMap;

use core_kernel::{
    document::{self, prefix},
    BranchScope, Money, PurchaseInvoiceId, PurchaseItemId, SupplierPaymentId,
};
use domain_billing::InvoiceTotals;
use domain_inventory::{MovementType, NewBatch, ProductCatalog, StockLedger};
use domain_treasury::{AccountStore, Direction};

use crate::error::PurchasingError;
use crate::invoice::{
    AddSupplierPayment, CreatePurchaseInvoice, PurchaseInvoice, PurchaseItem, SupplierPayment,
};

/// In-memory store of purchase invoices and supplier payments.
#[derive(Debug, Default)]
pub struct PurchaseDesk {
    invoices: HashMap<PurchaseInvoiceId, PurchaseInvoice>,
    payments: Vec<SupplierPayment>,
}

impl PurchaseDesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invoice(&self, id: PurchaseInvoiceId) -> Option<&PurchaseInvoice> {
        self.invoices.get(&id)
    }

    pub fn invoices(&self) -> impl Iterator<Item = &PurchaseInvoice> {
        self.invoices.values()
    }

    pub fn payments_for(&self, invoice_id: PurchaseInvoiceId) -> Vec<&SupplierPayment> {
        self.payments
            .iter()
            .filter(|p| p.invoice_id == invoice_id)
            .collect()
    }

    /// Records a purchase, receiving its goods into stock.
    ///
    /// # Errors
    ///
    /// - Validation for empty lines, non-positive quantities, negative
    ///   costs, a line discount exceeding its line amount, or a payment
    ///   exceeding the invoice total
    /// - Not found for products missing from the catalog
    /// - `TreasuryError::InsufficientFunds` when the paying account cannot
    ///   cover the up-front payment
    pub fn create_invoice(
        &mut self,
        catalog: &ProductCatalog,
        stock: &mut StockLedger,
        accounts: &mut AccountStore,
        input: CreatePurchaseInvoice,
    ) -> Result<PurchaseInvoice, PurchasingError> {
        if input.lines.is_empty() {
            return Err(PurchasingError::validation("invoice requires at least one line"));
        }
        if input.discount.is_negative() {
            return Err(PurchasingError::validation("discount must not be negative"));
        }
        if input.tax.is_negative() {
            return Err(PurchasingError::validation("tax must not be negative"));
        }
        if input.paid_amount.is_negative() {
            return Err(PurchasingError::validation("paid amount must not be negative"));
        }

        let mut sell_prices = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            if !line.quantity.is_positive() {
                return Err(PurchasingError::validation(format!(
                    "line quantity must be positive, got {}",
                    line.quantity
                )));
            }
            if line.unit_cost.is_negative() {
                return Err(PurchasingError::validation("unit cost must not be negative"));
            }
            if line.discount.is_negative() {
                return Err(PurchasingError::validation("line discount must not be negative"));
            }
            let gross = line.quantity.times_cost(line.unit_cost);
            if line.discount > gross {
                return Err(PurchasingError::validation(format!(
                    "line discount {} exceeds the line amount {gross}",
                    line.discount
                )));
            }
            let product = catalog
                .get(line.product_id)
                .ok_or_else(|| PurchasingError::not_found(format!("product {}", line.product_id)))?;
            sell_prices.push(line.sell_price.unwrap_or(product.sell_price));
        }

        let subtotal: Money = input
            .lines
            .iter()
            .map(|line| line.quantity.times_cost(line.unit_cost) - line.discount)
            .sum();
        let totals = InvoiceTotals::compute(subtotal, input.discount, input.tax, input.paid_amount);
        if input.paid_amount > totals.total {
            return Err(PurchasingError::validation(format!(
                "payment {} exceeds invoice total {}",
                input.paid_amount, totals.total
            )));
        }

        // Check funds before a single batch is received.
        if totals.paid.is_positive() {
            accounts.ensure_funds(
                input.branch_id,
                input.payment_method.account(),
                totals.paid,
                "supplier payment",
            )?;
        }

        let doc_number = document::doc_number(prefix::PURCHASE_INVOICE);
        let mut items = Vec::with_capacity(input.lines.len());
        for (line, sell_price) in input.lines.iter().zip(sell_prices) {
            let item_id = PurchaseItemId::new_v7();
            let batch_id = stock.receive_batch(NewBatch {
                product_id: line.product_id,
                branch_id: input.branch_id,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                sell_price,
                batch_number: line
                    .batch_number
                    .clone()
                    .unwrap_or_else(|| document::doc_number(prefix::STOCK_BATCH)),
                expiry_date: line.expiry_date,
                purchase_item_id: Some(item_id),
            })?;
            stock.record_movement(
                line.product_id,
                input.branch_id,
                MovementType::Purchase,
                line.quantity,
                line.unit_cost,
                Some(doc_number.clone()),
            );
            items.push(PurchaseItem {
                id: item_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                discount: line.discount,
                line_total: line.quantity.times_cost(line.unit_cost) - line.discount,
                batch_id,
            });
        }

        let invoice_id = PurchaseInvoiceId::new_v7();
        if totals.paid.is_positive() {
            accounts.apply_movement(
                input.branch_id,
                input.payment_method.account(),
                Direction::Out,
                totals.paid,
                "supplier payment",
            )?;
            self.payments.push(SupplierPayment {
                id: SupplierPaymentId::new_v7(),
                invoice_id,
                amount: totals.paid,
                payment_method: input.payment_method,
                created_by: input.created_by,
                paid_at: Utc::now(),
            });
        }

        let invoice = PurchaseInvoice {
            id: invoice_id,
            doc_number: doc_number.clone(),
            branch_id: input.branch_id,
            supplier_id: input.supplier_id,
            items,
            totals,
            status: totals.purchase_status(),
            created_by: input.created_by,
            created_at: Utc::now(),
        };

        tracing::info!(
            doc_number = %doc_number,
            branch = %input.branch_id,
            total = %totals.total,
            paid = %totals.paid,
            status = ?invoice.status,
            "purchase invoice created"
        );

        self.invoices.insert(invoice_id, invoice.clone());
        Ok(invoice)
    }

    /// Pays down a supplier invoice's outstanding balance.
    ///
    /// # Errors
    ///
    /// - Not found for unknown invoices or out-of-scope branches
    /// - Validation when the invoice is settled or the amount is
    ///   non-positive or exceeds what is due
    /// - `TreasuryError::InsufficientFunds` when the account is short
    pub fn add_payment(
        &mut self,
        accounts: &mut AccountStore,
        scope: BranchScope,
        input: AddSupplierPayment,
    ) -> Result<SupplierPayment, PurchasingError> {
        let invoice = self.invoices.get(&input.invoice_id).ok_or_else(|| {
            PurchasingError::not_found(format!("purchase invoice {}", input.invoice_id))
        })?;
        scope.check(invoice.branch_id, "purchase invoice")?;

        if !input.amount.is_positive() {
            return Err(PurchasingError::validation("payment amount must be positive"));
        }
        if invoice.totals.due.is_zero() {
            return Err(PurchasingError::validation(format!(
                "invoice {} is already settled",
                invoice.doc_number
            )));
        }
        if input.amount > invoice.totals.due {
            return Err(PurchasingError::validation(format!(
                "payment {} exceeds amount due {}",
                input.amount, invoice.totals.due
            )));
        }

        let branch_id = invoice.branch_id;
        accounts.apply_movement(
            branch_id,
            input.payment_method.account(),
            Direction::Out,
            input.amount,
            "supplier payment",
        )?;

        let invoice = self.invoices.get_mut(&input.invoice_id).unwrap();
        invoice.totals = invoice.totals.with_paid(invoice.totals.paid + input.amount);
        invoice.status = invoice.totals.purchase_status();

        let payment = SupplierPayment {
            id: SupplierPaymentId::new_v7(),
            invoice_id: input.invoice_id,
            amount: input.amount,
            payment_method: input.payment_method,
            created_by: input.created_by,
            paid_at: Utc::now(),
        };
        self.payments.push(payment.clone());
        Ok(payment)
    }
}
