//! Fiscal reports
//!
//! Reports are pure reads over the live stores. Revenue and cost of goods
//! come from sales invoices net of their returns; the balance sheet values
//! remaining stock at batch cost and counts only net-debtor customers as
//! receivables.

use serde::{Deserialize, Serialize};

use core_kernel::{BranchId, FiscalPeriod, Money};
use domain_billing::CustomerLedger;
use domain_inventory::StockLedger;
use domain_purchasing::PurchaseDesk;
use domain_sales::SalesDesk;
use domain_treasury::{AccountStore, BranchBalances, Expense, OwnerWithdrawal};

/// Everything a fiscal report reads from.
pub struct ReportContext<'a> {
    pub sales: &'a SalesDesk,
    pub purchases: &'a PurchaseDesk,
    pub expenses: &'a [Expense],
    pub withdrawals: &'a [OwnerWithdrawal],
    pub accounts: &'a AccountStore,
    pub stock: &'a StockLedger,
    pub ledger: &'a CustomerLedger,
    /// Branches to aggregate over
    pub branches: &'a [BranchId],
}

/// Trading result for one fiscal period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitSummary {
    pub period: FiscalPeriod,
    /// Sales totals net of returns
    pub revenue: Money,
    /// FIFO cost of the goods sold, net of restocked returns
    pub cost_of_goods: Money,
    pub gross_profit: Money,
    pub expenses: Money,
    pub net_profit: Money,
}

/// Point-in-time financial position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Account balances summed across the reported branches
    pub balances: BranchBalances,
    /// Remaining stock valued at batch cost
    pub stock_value: Money,
    /// What net-debtor customers owe
    pub receivables: Money,
    pub total_assets: Money,
    /// What is still due to suppliers
    pub payables: Money,
    /// Assets less payables
    pub equity: Money,
}

/// The full picture captured at year end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearEndSummary {
    pub period: FiscalPeriod,
    pub profit: ProfitSummary,
    pub balance_sheet: BalanceSheet,
    /// Supplier purchases invoiced during the period
    pub purchases_total: Money,
    /// Owner withdrawals taken during the period
    pub withdrawals_total: Money,
}

/// Computes the trading result for a period.
pub fn profit_summary(period: FiscalPeriod, ctx: &ReportContext<'_>) -> ProfitSummary {
    let mut revenue = Money::ZERO;
    let mut cost_of_goods = Money::ZERO;

    for invoice in ctx.sales.invoices() {
        if !period.contains(invoice.created_at.date_naive()) {
            continue;
        }
        revenue += invoice.effective_total();
        cost_of_goods += invoice.items.iter().map(|i| i.cost_of_goods).sum::<Money>();
    }

    // Returned goods went back into stock at their original cost, so they
    // come back out of cost of goods.
    for sales_return in ctx.sales.returns() {
        if !period.contains(sales_return.created_at.date_naive()) {
            continue;
        }
        let Some(invoice) = ctx.sales.invoice(sales_return.invoice_id) else {
            continue;
        };
        for item in &sales_return.items {
            if let Some(sold) = invoice.item(item.sales_item_id) {
                if sold.quantity.is_positive() {
                    let unit_cost =
                        Money::new(sold.cost_of_goods.amount() / sold.quantity.value());
                    cost_of_goods -= item.quantity.times_cost(unit_cost);
                }
            }
        }
    }

    let expenses: Money = ctx
        .expenses
        .iter()
        .filter(|e| period.contains(e.paid_at.date_naive()))
        .map(|e| e.amount)
        .sum();

    let gross_profit = revenue - cost_of_goods;
    ProfitSummary {
        period,
        revenue,
        cost_of_goods,
        gross_profit,
        expenses,
        net_profit: gross_profit - expenses,
    }
}

/// Computes the financial position across the context's branches.
pub fn balance_sheet(ctx: &ReportContext<'_>) -> BalanceSheet {
    let mut balances = BranchBalances::default();
    let mut stock_value = Money::ZERO;
    for branch in ctx.branches {
        let b = ctx.accounts.balances(*branch);
        balances.cash += b.cash;
        balances.bank += b.bank;
        balances.card += b.card;
        stock_value += ctx.stock.stock_value(*branch);
    }

    let receivables = ctx.ledger.total_outstanding();
    let total_assets = balances.total() + stock_value + receivables;
    let payables: Money = ctx
        .purchases
        .invoices()
        .map(|p| p.totals.due)
        .sum();
    BalanceSheet {
        balances,
        stock_value,
        receivables,
        total_assets,
        payables,
        equity: total_assets - payables,
    }
}

/// Assembles the full year-end summary for a period.
pub fn year_end_summary(period: FiscalPeriod, ctx: &ReportContext<'_>) -> YearEndSummary {
    let profit = profit_summary(period, ctx);
    let sheet = balance_sheet(ctx);

    let purchases_total: Money = ctx
        .purchases
        .invoices()
        .filter(|p| period.contains(p.created_at.date_naive()))
        .map(|p| p.totals.total)
        .sum();
    let withdrawals_total: Money = ctx
        .withdrawals
        .iter()
        .filter(|w| period.contains(w.withdrawn_at.date_naive()))
        .map(|w| w.amount)
        .sum();

    YearEndSummary {
        period,
        profit,
        balance_sheet: sheet,
        purchases_total,
        withdrawals_total,
    }
}
