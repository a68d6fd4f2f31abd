//! Purchasing domain - supplier invoices and stock receipt
//!
//! A purchase is the inbound mirror of a sale: goods arrive as costed
//! batches, the supplier is paid out of a branch account, and the invoice
//! tracks what is still owed.

pub mod desk;
pub mod error;
pub mod invoice;

pub use desk::PurchaseDesk;
pub use error::PurchasingError;
pub use invoice::{
    AddSupplierPayment, CreatePurchaseInvoice, PurchaseInvoice, PurchaseItem, PurchaseLine,
    SupplierPayment,
};
