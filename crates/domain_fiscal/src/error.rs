//! Fiscal domain errors

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FiscalError {
    #[error("Fiscal year {fiscal_year} is already closed")]
    AlreadyClosed { fiscal_year: i32 },

    #[error("Fiscal period runs until {period_end}; it cannot be closed before it ends")]
    PeriodStillOpen { period_end: NaiveDate },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl FiscalError {
    pub fn validation(message: impl Into<String>) -> Self {
        FiscalError::Validation(message.into())
    }
}
