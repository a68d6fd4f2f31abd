//! Sales return records and inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    Money, ProductId, Quantity, ReturnItemId, SalesInvoiceId, SalesItemId, SalesReturnId, UserId,
};
use domain_treasury::PaymentMethod;

/// One line of a return request.
///
/// A line names the invoice line it undoes, or just the product; a
/// product-only line resolves to the invoice's first line selling that
/// product.
#[derive(Debug, Clone)]
pub struct ReturnLine {
    pub sales_item_id: Option<SalesItemId>,
    pub product_id: Option<ProductId>,
    pub quantity: Quantity,
}

impl ReturnLine {
    pub fn for_item(sales_item_id: SalesItemId, quantity: Quantity) -> Self {
        Self {
            sales_item_id: Some(sales_item_id),
            product_id: None,
            quantity,
        }
    }

    pub fn for_product(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            sales_item_id: None,
            product_id: Some(product_id),
            quantity,
        }
    }
}

/// Input for returning goods against an invoice.
#[derive(Debug, Clone)]
pub struct CreateSalesReturn {
    pub invoice_id: SalesInvoiceId,
    pub lines: Vec<ReturnLine>,
    /// Cash the customer asked back; capped at the return total and at what
    /// they actually paid. None means refund as much as those caps allow.
    pub refund_requested: Option<Money>,
    pub refund_method: PaymentMethod,
    pub created_by: Option<UserId>,
}

/// A stored return line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnItem {
    pub id: ReturnItemId,
    pub sales_item_id: SalesItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A completed sales return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReturn {
    pub id: SalesReturnId,
    pub doc_number: String,
    pub invoice_id: SalesInvoiceId,
    pub items: Vec<ReturnItem>,
    /// Value of the returned goods at their sale prices
    pub return_total: Money,
    /// Cash actually handed back
    pub refund: Money,
    pub refund_method: PaymentMethod,
    /// Portion of the return credited to the customer ledger instead of
    /// refunded in cash
    pub ledger_credit: Money,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}
