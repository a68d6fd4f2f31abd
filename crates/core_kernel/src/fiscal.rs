//! Fiscal year period resolution
//!
//! A company's fiscal year starts on the first day of a configurable month.
//! Given a requested (or absent) year, this module resolves the concrete
//! 365/366-day window that year covers. `today` is always passed in
//! explicitly so period resolution stays deterministic and testable.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 3000;

/// A resolved fiscal year window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// The fiscal year label (the calendar year the period starts in)
    pub fiscal_year: i32,
    /// First month of the fiscal year (1-12)
    pub start_month: u32,
    /// First day of the period
    pub period_start: NaiveDate,
    /// Last day of the period
    pub period_end: NaiveDate,
}

impl FiscalPeriod {
    /// Returns true if `date` falls inside the period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.period_start && date <= self.period_end
    }

    /// Human-readable period label, e.g. `2024-07-01 to 2025-06-30`.
    pub fn label(&self) -> String {
        format!("{} to {}", self.period_start, self.period_end)
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FY{} ({})", self.fiscal_year, self.label())
    }
}

/// Clamps a fiscal start month into 1..=12, falling back to January.
pub fn normalize_start_month(month: u32) -> u32 {
    if (1..=12).contains(&month) {
        month
    } else {
        1
    }
}

/// Resolves the fiscal period for a requested year.
///
/// When `requested_year` is absent or outside the plausible range, the
/// current fiscal year is inferred from `today`: if today comes before this
/// calendar year's fiscal start, the running fiscal year began last year.
pub fn resolve_fiscal_year_period(
    start_month: u32,
    requested_year: Option<i32>,
    today: NaiveDate,
) -> FiscalPeriod {
    let start_month = normalize_start_month(start_month);

    let fiscal_year = match requested_year {
        Some(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => year,
        _ => {
            let current_year_start = first_of_month(today.year(), start_month);
            if today < current_year_start {
                today.year() - 1
            } else {
                today.year()
            }
        }
    };

    let period_start = first_of_month(fiscal_year, start_month);
    let period_end = first_of_month(fiscal_year + 1, start_month)
        .checked_sub_days(Days::new(1))
        .unwrap_or(period_start);

    FiscalPeriod {
        fiscal_year,
        start_month,
        period_start,
        period_end,
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // month is already clamped to 1..=12 and year to a plausible range,
    // so the date always exists.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}
