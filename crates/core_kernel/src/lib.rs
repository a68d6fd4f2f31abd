//! Core Kernel - Foundational types and utilities for the retail system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money and quantity types with precise decimal arithmetic
//! - Fiscal year period resolution
//! - Common identifiers and value objects
//! - Audit and branch-scope primitives

pub mod audit;
pub mod document;
pub mod error;
pub mod fiscal;
pub mod identifiers;
pub mod money;
pub mod scope;

pub use audit::{AuditAction, AuditEvent, AuditSink, NoopAuditSink};
pub use error::CoreError;
pub use fiscal::{resolve_fiscal_year_period, FiscalPeriod};
pub use identifiers::{
    BatchId, BranchId, CompanyId, CustomerId, ExpenseId, FiscalCloseId, LedgerEntryId,
    LoyaltyTxId, MovementId, ProductId, PurchaseInvoiceId, PurchaseItemId, ReturnItemId,
    SalesInvoiceId, SalesItemId, SalesPaymentId, SalesReturnId, SupplierId, SupplierPaymentId,
    TransferId, TransferItemId, UserId, WithdrawalId,
};
pub use money::{Money, Quantity};
pub use scope::BranchScope;
