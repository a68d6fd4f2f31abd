//! Treasury repository
//!
//! Branch account balances on PostgreSQL. Every debit locks the balance
//! row with `FOR UPDATE` before checking funds, so concurrent outflows
//! cannot both pass the check against the same money.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use core_kernel::{BranchId, Money};
use domain_treasury::{
    AccountType, BranchBalances, CreateExpense, CreateWithdrawal, Expense, OwnerWithdrawal,
    TreasuryError,
};

use crate::error::DatabaseError;

/// Locks a balance row, verifies it covers `amount`, and debits it.
///
/// The row is created at zero if the account has never been touched, which
/// makes an under-funded debit fail with insufficient funds rather than a
/// missing row.
pub(crate) async fn debit_account_tx(
    tx: &mut Transaction<'_, Postgres>,
    branch_id: Uuid,
    account: AccountType,
    amount: Money,
    purpose: &str,
) -> Result<(), DatabaseError> {
    if !amount.is_positive() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO account_balances (branch_id, account_type, balance)
        VALUES ($1, $2, 0)
        ON CONFLICT (branch_id, account_type) DO NOTHING
        "#,
    )
    .bind(branch_id)
    .bind(account.as_str())
    .execute(&mut **tx)
    .await?;

    let available: Decimal = sqlx::query_scalar(
        "SELECT balance FROM account_balances WHERE branch_id = $1 AND account_type = $2 FOR UPDATE",
    )
    .bind(branch_id)
    .bind(account.as_str())
    .fetch_one(&mut **tx)
    .await?;

    if Money::new(available) < amount {
        return Err(DatabaseError::Treasury(TreasuryError::InsufficientFunds {
            account_type: account,
            available: Money::new(available),
            required: amount,
            purpose: purpose.to_string(),
        }));
    }

    sqlx::query(
        r#"
        UPDATE account_balances
        SET balance = balance - $3, updated_at = now()
        WHERE branch_id = $1 AND account_type = $2
        "#,
    )
    .bind(branch_id)
    .bind(account.as_str())
    .bind(amount.amount())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Credits a balance row, creating it on first use.
pub(crate) async fn credit_account_tx(
    tx: &mut Transaction<'_, Postgres>,
    branch_id: Uuid,
    account: AccountType,
    amount: Money,
) -> Result<(), DatabaseError> {
    if !amount.is_positive() {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO account_balances (branch_id, account_type, balance)
        VALUES ($1, $2, $3)
        ON CONFLICT (branch_id, account_type)
        DO UPDATE SET balance = account_balances.balance + $3, updated_at = now()
        "#,
    )
    .bind(branch_id)
    .bind(account.as_str())
    .bind(amount.amount())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Repository for account balances, expenses, and withdrawals.
#[derive(Debug, Clone)]
pub struct TreasuryRepository {
    pool: PgPool,
}

impl TreasuryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Snapshot of a branch's three balances.
    pub async fn balances(&self, branch_id: BranchId) -> Result<BranchBalances, DatabaseError> {
        let rows: Vec<(String, Decimal)> = sqlx::query_as(
            "SELECT account_type, balance FROM account_balances WHERE branch_id = $1",
        )
        .bind(Uuid::from(branch_id))
        .fetch_all(&self.pool)
        .await?;

        let mut balances = BranchBalances::default();
        for (account, amount) in rows {
            let amount = Money::new(amount);
            match account.as_str() {
                "CASH" => balances.cash = amount,
                "BANK" => balances.bank = amount,
                "CARD" => balances.card = amount,
                _ => {}
            }
        }
        Ok(balances)
    }

    /// Overwrites a branch's balances with explicit non-negative figures.
    pub async fn set_balances(
        &self,
        branch_id: BranchId,
        balances: BranchBalances,
    ) -> Result<(), DatabaseError> {
        for account in AccountType::ALL {
            if balances.get(account).is_negative() {
                return Err(DatabaseError::validation(format!(
                    "{account} balance must not be negative"
                )));
            }
        }

        let mut tx = self.pool.begin().await?;
        for account in AccountType::ALL {
            sqlx::query(
                r#"
                INSERT INTO account_balances (branch_id, account_type, balance)
                VALUES ($1, $2, $3)
                ON CONFLICT (branch_id, account_type)
                DO UPDATE SET balance = $3, updated_at = now()
                "#,
            )
            .bind(Uuid::from(branch_id))
            .bind(account.as_str())
            .bind(balances.get(account).amount())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Records an expense and debits the paying account atomically.
    pub async fn record_expense(&self, input: &CreateExpense) -> Result<Expense, DatabaseError> {
        if !input.amount.is_positive() {
            return Err(DatabaseError::validation("expense amount must be positive"));
        }
        if input.category.trim().is_empty() {
            return Err(DatabaseError::validation("expense category is required"));
        }

        let id = Uuid::now_v7();
        let branch = Uuid::from(input.branch_id);
        let mut tx = self.pool.begin().await?;
        debit_account_tx(
            &mut tx,
            branch,
            input.payment_method.account(),
            input.amount,
            "expense",
        )
        .await?;
        sqlx::query(
            r#"
            INSERT INTO expenses (id, branch_id, category, description, amount, payment_method, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(branch)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.amount.amount())
        .bind(payment_method_str(input.payment_method))
        .bind(input.created_by.map(Uuid::from))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Expense {
            id: id.into(),
            branch_id: input.branch_id,
            category: input.category.clone(),
            description: input.description.clone(),
            amount: input.amount,
            payment_method: input.payment_method,
            created_by: input.created_by,
            paid_at: chrono::Utc::now(),
        })
    }

    /// Records an owner withdrawal and debits the paying account atomically.
    pub async fn record_withdrawal(
        &self,
        input: &CreateWithdrawal,
    ) -> Result<OwnerWithdrawal, DatabaseError> {
        if !input.amount.is_positive() {
            return Err(DatabaseError::validation("withdrawal amount must be positive"));
        }

        let id = Uuid::now_v7();
        let branch = Uuid::from(input.branch_id);
        let mut tx = self.pool.begin().await?;
        debit_account_tx(
            &mut tx,
            branch,
            input.payment_method.account(),
            input.amount,
            "owner withdrawal",
        )
        .await?;
        sqlx::query(
            r#"
            INSERT INTO owner_withdrawals (id, branch_id, amount, payment_method, note, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(branch)
        .bind(input.amount.amount())
        .bind(payment_method_str(input.payment_method))
        .bind(&input.note)
        .bind(input.created_by.map(Uuid::from))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(OwnerWithdrawal {
            id: id.into(),
            branch_id: input.branch_id,
            amount: input.amount,
            payment_method: input.payment_method,
            note: input.note.clone(),
            created_by: input.created_by,
            withdrawn_at: chrono::Utc::now(),
        })
    }
}

pub(crate) fn payment_method_str(method: domain_treasury::PaymentMethod) -> &'static str {
    match method {
        domain_treasury::PaymentMethod::Cash => "CASH",
        domain_treasury::PaymentMethod::Card => "CARD",
        domain_treasury::PaymentMethod::BankTransfer => "BANK_TRANSFER",
        domain_treasury::PaymentMethod::MobileWallet => "MOBILE_WALLET",
    }
}
