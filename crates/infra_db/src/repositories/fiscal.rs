//! Fiscal repository
//!
//! Persists year-end closes. The UNIQUE constraint on `(branch_id,
//! fiscal_year)` is the final word on double closes; the explicit pre-check
//! just produces a friendlier error for the common case.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{
    AuditAction, AuditSink, BranchId, FiscalCloseId, FiscalPeriod, NoopAuditSink, UserId,
};
use domain_fiscal::{FiscalClose, FiscalError, YearEndSummary};

use crate::error::DatabaseError;
use crate::repositories::audit_event;

#[derive(sqlx::FromRow)]
struct CloseRow {
    id: Uuid,
    branch_id: Uuid,
    fiscal_year: i32,
    start_month: i32,
    period_start: NaiveDate,
    period_end: NaiveDate,
    snapshot: Value,
    closed_by: Option<Uuid>,
    closed_at: chrono::DateTime<Utc>,
}

impl From<CloseRow> for FiscalClose {
    fn from(row: CloseRow) -> Self {
        FiscalClose {
            id: FiscalCloseId::from_uuid(row.id),
            branch_id: BranchId::from_uuid(row.branch_id),
            fiscal_year: row.fiscal_year,
            period: FiscalPeriod {
                fiscal_year: row.fiscal_year,
                start_month: row.start_month as u32,
                period_start: row.period_start,
                period_end: row.period_end,
            },
            snapshot: row.snapshot,
            closed_by: row.closed_by.map(UserId::from_uuid),
            closed_at: row.closed_at,
        }
    }
}

/// Repository for year-end close records.
#[derive(Clone)]
pub struct FiscalRepository {
    pool: PgPool,
    audit: Arc<dyn AuditSink>,
}

impl FiscalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self::with_audit(pool, Arc::new(NoopAuditSink))
    }

    pub fn with_audit(pool: PgPool, audit: Arc<dyn AuditSink>) -> Self {
        Self { pool, audit }
    }

    /// Freezes a branch's fiscal year, rejecting double and early closes.
    ///
    /// # Errors
    ///
    /// - [`FiscalError::AlreadyClosed`] when the branch already closed the
    ///   year
    /// - [`FiscalError::PeriodStillOpen`] when `today` is on or before the
    ///   period's last day
    pub async fn close_year(
        &self,
        branch_id: BranchId,
        period: FiscalPeriod,
        summary: &YearEndSummary,
        today: NaiveDate,
        closed_by: Option<UserId>,
    ) -> Result<FiscalClose, DatabaseError> {
        if today <= period.period_end {
            return Err(DatabaseError::Fiscal(FiscalError::PeriodStillOpen {
                period_end: period.period_end,
            }));
        }

        let branch = Uuid::from(branch_id);
        let mut tx = self.pool.begin().await?;
        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT fiscal_year FROM fiscal_closes WHERE branch_id = $1 AND fiscal_year = $2",
        )
        .bind(branch)
        .bind(period.fiscal_year)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(DatabaseError::Fiscal(FiscalError::AlreadyClosed {
                fiscal_year: period.fiscal_year,
            }));
        }

        let close = FiscalClose {
            id: FiscalCloseId::new_v7(),
            branch_id,
            fiscal_year: period.fiscal_year,
            period,
            snapshot: serde_json::to_value(summary)
                .map_err(|err| DatabaseError::Fiscal(FiscalError::from(err)))?,
            closed_by,
            closed_at: Utc::now(),
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO fiscal_closes (
                id, branch_id, fiscal_year, start_month, period_start, period_end,
                snapshot, closed_by, closed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (branch_id, fiscal_year) DO NOTHING
            "#,
        )
        .bind(Uuid::from(close.id))
        .bind(branch)
        .bind(close.fiscal_year)
        .bind(period.start_month as i32)
        .bind(period.period_start)
        .bind(period.period_end)
        .bind(&close.snapshot)
        .bind(closed_by.map(Uuid::from))
        .bind(close.closed_at)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            // Lost a race with a concurrent close of the same year.
            return Err(DatabaseError::Fiscal(FiscalError::AlreadyClosed {
                fiscal_year: period.fiscal_year,
            }));
        }
        tx.commit().await?;

        self.audit
            .record(audit_event(
                AuditAction::Close,
                "fiscal_year",
                Uuid::from(close.id),
                closed_by,
                serde_json::json!({
                    "branch_id": branch,
                    "fiscal_year": close.fiscal_year,
                }),
            ))
            .await;

        tracing::info!(
            branch = %branch_id,
            fiscal_year = close.fiscal_year,
            "fiscal year closed"
        );
        Ok(close)
    }

    /// Loads a branch's close record for a fiscal year, if one exists.
    pub async fn get(
        &self,
        branch_id: BranchId,
        fiscal_year: i32,
    ) -> Result<Option<FiscalClose>, DatabaseError> {
        let row: Option<CloseRow> = sqlx::query_as(
            r#"
            SELECT id, branch_id, fiscal_year, start_month, period_start, period_end,
                   snapshot, closed_by, closed_at
            FROM fiscal_closes WHERE branch_id = $1 AND fiscal_year = $2
            "#,
        )
        .bind(Uuid::from(branch_id))
        .bind(fiscal_year)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FiscalClose::from))
    }

    pub async fn is_closed(
        &self,
        branch_id: BranchId,
        fiscal_year: i32,
    ) -> Result<bool, DatabaseError> {
        Ok(self.get(branch_id, fiscal_year).await?.is_some())
    }
}
