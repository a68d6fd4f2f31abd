//! Year-end close
//!
//! Closing a fiscal year freezes its figures into an immutable JSON
//! snapshot. Each branch closes on its own; a (branch, year) pair can only
//! be closed once, and only after its period has fully ended; trading
//! mid-year is never frozen.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{BranchId, FiscalCloseId, FiscalPeriod, UserId};

use crate::error::FiscalError;
use crate::reports::YearEndSummary;

/// A branch's closed fiscal year and its frozen figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalClose {
    pub id: FiscalCloseId,
    pub branch_id: BranchId,
    pub fiscal_year: i32,
    pub period: FiscalPeriod,
    /// The year-end summary as it stood at close time
    pub snapshot: serde_json::Value,
    pub closed_by: Option<UserId>,
    pub closed_at: DateTime<Utc>,
}

/// Registry of closed fiscal years, one record per (branch, year).
#[derive(Debug, Default)]
pub struct CloseBook {
    closes: HashMap<(BranchId, i32), FiscalClose>,
}

impl CloseBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self, branch_id: BranchId, fiscal_year: i32) -> bool {
        self.closes.contains_key(&(branch_id, fiscal_year))
    }

    pub fn get(&self, branch_id: BranchId, fiscal_year: i32) -> Option<&FiscalClose> {
        self.closes.get(&(branch_id, fiscal_year))
    }

    /// Closes a branch's fiscal year, freezing `summary` as its snapshot.
    ///
    /// `today` is passed explicitly so the end-of-period check is
    /// deterministic.
    ///
    /// # Errors
    ///
    /// - [`FiscalError::AlreadyClosed`] when the branch already closed the
    ///   year
    /// - [`FiscalError::PeriodStillOpen`] when `today` is on or before the
    ///   period's last day
    pub fn close(
        &mut self,
        branch_id: BranchId,
        period: FiscalPeriod,
        summary: &YearEndSummary,
        today: NaiveDate,
        closed_by: Option<UserId>,
    ) -> Result<&FiscalClose, FiscalError> {
        if self.is_closed(branch_id, period.fiscal_year) {
            return Err(FiscalError::AlreadyClosed {
                fiscal_year: period.fiscal_year,
            });
        }
        if today <= period.period_end {
            return Err(FiscalError::PeriodStillOpen {
                period_end: period.period_end,
            });
        }

        let close = FiscalClose {
            id: FiscalCloseId::new_v7(),
            branch_id,
            fiscal_year: period.fiscal_year,
            period,
            snapshot: serde_json::to_value(summary)?,
            closed_by,
            closed_at: Utc::now(),
        };

        tracing::info!(
            branch = %branch_id,
            fiscal_year = period.fiscal_year,
            "fiscal year closed"
        );
        Ok(self
            .closes
            .entry((branch_id, period.fiscal_year))
            .or_insert(close))
    }
}
