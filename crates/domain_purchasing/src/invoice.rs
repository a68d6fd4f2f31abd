//! Purchase invoice records and inputs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    BatchId, BranchId, Money, ProductId, PurchaseInvoiceId, PurchaseItemId, Quantity, SupplierId,
    SupplierPaymentId, UserId,
};
use domain_billing::{InvoiceTotals, PurchaseInvoiceStatus};
use domain_treasury::PaymentMethod;

/// One line of goods received from a supplier.
#[derive(Debug, Clone)]
pub struct PurchaseLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// What the supplier charged per unit
    pub unit_cost: Money,
    /// Supplier discount on this line; capped at the line's gross value
    pub discount: Money,
    /// Selling price for the new batch; defaults to the product's price
    pub sell_price: Option<Money>,
    pub expiry_date: Option<NaiveDate>,
    /// Supplier's lot number; a document number is generated when absent
    pub batch_number: Option<String>,
}

/// Input for recording a purchase.
#[derive(Debug, Clone)]
pub struct CreatePurchaseInvoice {
    pub branch_id: BranchId,
    pub supplier_id: Option<SupplierId>,
    pub lines: Vec<PurchaseLine>,
    pub discount: Money,
    pub tax: Money,
    /// Paid to the supplier up front; must not exceed the invoice total
    pub paid_amount: Money,
    pub payment_method: PaymentMethod,
    pub created_by: Option<UserId>,
}

/// Input for paying down a supplier invoice.
#[derive(Debug, Clone)]
pub struct AddSupplierPayment {
    pub invoice_id: PurchaseInvoiceId,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub created_by: Option<UserId>,
}

/// A stored purchase line, tied to the stock batch it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub id: PurchaseItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_cost: Money,
    pub discount: Money,
    /// Gross line value minus the line discount
    pub line_total: Money,
    pub batch_id: BatchId,
}

/// A stored purchase invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseInvoice {
    pub id: PurchaseInvoiceId,
    pub doc_number: String,
    pub branch_id: BranchId,
    pub supplier_id: Option<SupplierId>,
    pub items: Vec<PurchaseItem>,
    pub totals: InvoiceTotals,
    pub status: PurchaseInvoiceStatus,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// A payment made to a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierPayment {
    pub id: SupplierPaymentId,
    pub invoice_id: PurchaseInvoiceId,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub created_by: Option<UserId>,
    pub paid_at: DateTime<Utc>,
}
