//! Billing domain - invoice totals, customer ledger, and loyalty
//!
//! The totals engine is the single place invoice money columns are derived;
//! sales and purchasing both go through it. Customer debt and loyalty
//! points live here too, keyed off the documents those domains produce.

pub mod customer;
pub mod error;
pub mod ledger;
pub mod totals;

pub use customer::{
    points_for, Customer, CustomerDirectory, LoyaltyTransaction, LoyaltyTxType,
};
pub use error::BillingError;
pub use ledger::{CustomerLedger, EntryType, LedgerEntry};
pub use totals::{InvoiceTotals, PurchaseInvoiceStatus, SalesInvoiceStatus};
