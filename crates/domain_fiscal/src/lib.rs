//! Fiscal domain - reporting and year-end close
//!
//! Reads the other domains' stores to produce profit and balance reports,
//! and freezes a year's figures into an immutable snapshot when the books
//! are closed.

pub mod close;
pub mod error;
pub mod reports;

pub use close::{CloseBook, FiscalClose};
pub use error::FiscalError;
pub use reports::{
    balance_sheet, profit_summary, year_end_summary, BalanceSheet, ProfitSummary, ReportContext,
    YearEndSummary,
};
