//! Sales domain - invoices, payments, and returns
//!
//! A sale is one atomic move across inventory (FIFO consumption), treasury
//! (the payment landing in a branch account), and billing (totals, ledger
//! debt, loyalty). The [`SalesDesk`] sequences those moves so that every
//! failure path leaves all three untouched.

pub mod desk;
pub mod error;
pub mod invoice;
pub mod returns;

pub use desk::SalesDesk;
pub use error::SalesError;
pub use invoice::{
    AddSalesPayment, CreateSalesInvoice, SalesInvoice, SalesItem, SalesLine, SalesPayment,
};
pub use returns::{CreateSalesReturn, ReturnItem, ReturnLine, SalesReturn};
