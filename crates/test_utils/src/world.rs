//! In-memory retail world
//!
//! One branch with every store wired together, so end-to-end tests can
//! trade without repeating the setup boilerplate. The helpers seed data
//! through the same public APIs production code uses.

use rust_decimal_macros::dec;

use core_kernel::{BranchId, CustomerId, Money, ProductId, Quantity};
use domain_billing::{CustomerDirectory, CustomerLedger};
use domain_fiscal::ReportContext;
use domain_inventory::{ProductCatalog, StockLedger};
use domain_purchasing::PurchaseDesk;
use domain_sales::SalesDesk;
use domain_treasury::{AccountStore, BranchBalances, Expense, OwnerWithdrawal};

use crate::builders::{BatchBuilder, CustomerBuilder, ProductBuilder};

/// A single-branch retail operation held entirely in memory.
pub struct RetailWorld {
    pub branch: BranchId,
    pub catalog: ProductCatalog,
    pub stock: StockLedger,
    pub accounts: AccountStore,
    pub customers: CustomerDirectory,
    pub ledger: CustomerLedger,
    pub sales: SalesDesk,
    pub purchases: PurchaseDesk,
    pub expenses: Vec<Expense>,
    pub withdrawals: Vec<OwnerWithdrawal>,
    branches: Vec<BranchId>,
}

impl Default for RetailWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RetailWorld {
    pub fn new() -> Self {
        let branch = BranchId::new();
        Self {
            branch,
            catalog: ProductCatalog::new(),
            stock: StockLedger::new(),
            accounts: AccountStore::new(),
            customers: CustomerDirectory::new(),
            ledger: CustomerLedger::new(),
            sales: SalesDesk::new(),
            purchases: PurchaseDesk::new(),
            expenses: Vec::new(),
            withdrawals: Vec::new(),
            branches: vec![branch],
        }
    }

    /// Adds a product to the catalog without any stock.
    pub fn add_product(&mut self, name: &str, sell_price: Money) -> ProductId {
        self.catalog
            .add(ProductBuilder::new().named(name).priced(sell_price).build())
    }

    /// Adds a product and receives an opening batch for it.
    pub fn seed_product(
        &mut self,
        name: &str,
        sell_price: Money,
        quantity: Quantity,
        unit_cost: Money,
    ) -> ProductId {
        let id = self.add_product(name, sell_price);
        self.stock
            .receive_batch(
                BatchBuilder::new(id, self.branch)
                    .quantity(quantity)
                    .unit_cost(unit_cost)
                    .sell_price(sell_price)
                    .build(),
            )
            .unwrap();
        id
    }

    pub fn seed_customer(&mut self, name: &str) -> CustomerId {
        self.customers.add(CustomerBuilder::new().named(name).build())
    }

    /// Puts cash in the branch drawer.
    pub fn fund_cash(&mut self, amount: Money) {
        self.accounts
            .set_balances(
                self.branch,
                BranchBalances {
                    cash: amount,
                    bank: self.accounts.balances(self.branch).bank,
                    card: self.accounts.balances(self.branch).card,
                },
            )
            .unwrap();
    }

    /// Funds all three accounts with a comfortable float.
    pub fn fund_all(&mut self) {
        self.accounts
            .set_balances(
                self.branch,
                BranchBalances {
                    cash: Money::new(dec!(5000)),
                    bank: Money::new(dec!(5000)),
                    card: Money::new(dec!(5000)),
                },
            )
            .unwrap();
    }

    /// Borrows every store for report computation.
    pub fn report_context(&self) -> ReportContext<'_> {
        ReportContext {
            sales: &self.sales,
            purchases: &self.purchases,
            expenses: &self.expenses,
            withdrawals: &self.withdrawals,
            accounts: &self.accounts,
            stock: &self.stock,
            ledger: &self.ledger,
            branches: &self.branches,
        }
    }
}
