//! Sales invoice records and inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    BranchId, CustomerId, Money, ProductId, Quantity, SalesInvoiceId, SalesItemId, SalesPaymentId,
    UserId,
};
use domain_billing::{InvoiceTotals, SalesInvoiceStatus};
use domain_treasury::PaymentMethod;

/// One line of a sale as requested by the caller.
#[derive(Debug, Clone)]
pub struct SalesLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// Overrides the product's default selling price when present
    pub unit_price: Option<Money>,
    /// Amount knocked off this line; capped at the line's gross value
    pub discount: Money,
}

/// Input for creating a sales invoice.
#[derive(Debug, Clone)]
pub struct CreateSalesInvoice {
    pub branch_id: BranchId,
    /// Receives the ledger debit for any amount left due; a walk-in sale
    /// carries its due on the invoice alone
    pub customer_id: Option<CustomerId>,
    pub lines: Vec<SalesLine>,
    pub discount: Money,
    pub tax: Money,
    /// Amount tendered at the counter; clamped into `[0, total]`
    pub paid_amount: Money,
    pub payment_method: PaymentMethod,
    pub created_by: Option<UserId>,
}

/// Input for settling part of an invoice's outstanding balance.
#[derive(Debug, Clone)]
pub struct AddSalesPayment {
    pub invoice_id: SalesInvoiceId,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub created_by: Option<UserId>,
}

/// A priced, costed line of a stored invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesItem {
    pub id: SalesItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub discount: Money,
    /// Gross line value minus the line discount
    pub line_total: Money,
    /// FIFO acquisition cost of the units sold on this line
    pub cost_of_goods: Money,
}

/// A stored sales invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesInvoice {
    pub id: SalesInvoiceId,
    pub doc_number: String,
    pub branch_id: BranchId,
    pub customer_id: Option<CustomerId>,
    pub items: Vec<SalesItem>,
    pub totals: InvoiceTotals,
    pub status: SalesInvoiceStatus,
    /// Sum of all return totals recorded against this invoice
    pub returned_total: Money,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl SalesInvoice {
    /// Invoice total after deducting everything returned so far.
    pub fn effective_total(&self) -> Money {
        (self.totals.total - self.returned_total).max_zero()
    }

    /// What the customer still owes on this invoice.
    pub fn due(&self) -> Money {
        (self.effective_total() - self.totals.paid).max_zero()
    }

    pub fn item(&self, id: SalesItemId) -> Option<&SalesItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Recomputes the settlement status from the effective total.
    ///
    /// An invoice whose effective total reached zero, whether written off
    /// at the counter or fully returned, is not treated as paid.
    pub(crate) fn refresh_status(&mut self) {
        self.status = if self.effective_total().is_positive() && self.due().is_zero() {
            SalesInvoiceStatus::Paid
        } else if self.totals.paid.is_positive() {
            SalesInvoiceStatus::Partial
        } else {
            SalesInvoiceStatus::Unpaid
        };
    }
}

/// A received customer payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesPayment {
    pub id: SalesPaymentId,
    pub invoice_id: SalesInvoiceId,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub created_by: Option<UserId>,
    pub received_at: DateTime<Utc>,
}
