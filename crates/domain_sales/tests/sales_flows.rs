//! End-to-end sales flows: sell, settle, and return against live stock,
//! accounts, and customer records.

use rust_decimal_macros::dec;

use core_kernel::{BranchId, BranchScope, CompanyId, Money, Quantity};
use domain_billing::{Customer, CustomerDirectory, CustomerLedger, SalesInvoiceStatus};
use domain_inventory::{InventoryError, NewBatch, Product, ProductCatalog, StockLedger};
use domain_sales::{
    AddSalesPayment, CreateSalesInvoice, CreateSalesReturn, ReturnLine, SalesDesk, SalesError,
    SalesLine,
};
use domain_treasury::{
    AccountStore, AccountType, BranchBalances, PaymentMethod, TreasuryError,
};

struct World {
    branch: BranchId,
    catalog: ProductCatalog,
    stock: StockLedger,
    accounts: AccountStore,
    customers: CustomerDirectory,
    ledger: CustomerLedger,
    desk: SalesDesk,
}

fn world() -> World {
    World {
        branch: BranchId::new(),
        catalog: ProductCatalog::new(),
        stock: StockLedger::new(),
        accounts: AccountStore::new(),
        customers: CustomerDirectory::new(),
        ledger: CustomerLedger::new(),
        desk: SalesDesk::new(),
    }
}

impl World {
    fn seed_product(&mut self, name: &str, sell: Money, qty: Quantity, cost: Money) -> core_kernel::ProductId {
        let id = self.catalog.add(Product::new(CompanyId::new(), name, sell));
        self.stock
            .receive_batch(NewBatch {
                product_id: id,
                branch_id: self.branch,
                quantity: qty,
                unit_cost: cost,
                sell_price: sell,
                batch_number: "BAT-SEED".to_string(),
                expiry_date: None,
                purchase_item_id: None,
            })
            .unwrap();
        id
    }

    fn seed_customer(&mut self, name: &str) -> core_kernel::CustomerId {
        self.customers.add(Customer::new(CompanyId::new(), name))
    }
}

#[test]
fn cash_sale_moves_stock_and_money() {
    let mut w = world();
    let product = w.seed_product("Tea 500g", Money::new(dec!(10)), Quantity::new(dec!(20)), Money::new(dec!(6)));

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: None,
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(5)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(50)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    assert_eq!(invoice.totals.total, Money::new(dec!(50)));
    assert_eq!(invoice.status, SalesInvoiceStatus::Paid);
    assert_eq!(invoice.items[0].cost_of_goods, Money::new(dec!(30)));
    assert_eq!(w.stock.current_stock(product, w.branch), Quantity::new(dec!(15)));
    assert_eq!(w.accounts.balance(w.branch, AccountType::Cash), Money::new(dec!(50)));
}

#[test]
fn walk_in_credit_sale_skips_the_ledger() {
    let mut w = world();
    let product = w.seed_product("Tea 500g", Money::new(dec!(10)), Quantity::new(dec!(20)), Money::new(dec!(6)));

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: None,
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(2)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::ZERO,
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    // The due stays on the invoice; with no customer there is no debtor.
    assert_eq!(invoice.totals.due, Money::new(dec!(20)));
    assert_eq!(invoice.status, SalesInvoiceStatus::Unpaid);
    assert_eq!(w.stock.current_stock(product, w.branch), Quantity::new(dec!(18)));
    assert_eq!(w.ledger.total_outstanding(), Money::ZERO);
}

#[test]
fn stock_shortfall_rejects_the_whole_sale() {
    let mut w = world();
    let plenty = w.seed_product("Rice 5kg", Money::new(dec!(12)), Quantity::new(dec!(50)), Money::new(dec!(8)));
    let scarce = w.seed_product("Ghee 1kg", Money::new(dec!(20)), Quantity::new(dec!(1)), Money::new(dec!(14)));

    let err = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: None,
                lines: vec![
                    SalesLine {
                        product_id: plenty,
                        quantity: Quantity::new(dec!(10)),
                        unit_price: None,
                        discount: Money::ZERO,
                    },
                    SalesLine {
                        product_id: scarce,
                        quantity: Quantity::new(dec!(3)),
                        unit_price: None,
                        discount: Money::ZERO,
                    },
                ],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(500)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap_err();

    assert!(matches!(
        err,
        SalesError::Inventory(InventoryError::InsufficientStock { .. })
    ));
    // The first line must not have been consumed.
    assert_eq!(w.stock.current_stock(plenty, w.branch), Quantity::new(dec!(50)));
    assert_eq!(w.accounts.balance(w.branch, AccountType::Cash), Money::ZERO);
}

#[test]
fn partial_payment_then_settlement() {
    let mut w = world();
    let product = w.seed_product("Oil 1L", Money::new(dec!(9)), Quantity::new(dec!(30)), Money::new(dec!(7)));
    let customer = w.seed_customer("Dana");

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: Some(customer),
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(10)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::new(dec!(10)),
                tax: Money::new(dec!(5)),
                paid_amount: Money::new(dec!(35)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    // 90 - 10 + 5 = 85 total, 35 paid, 50 due.
    assert_eq!(invoice.totals.total, Money::new(dec!(85)));
    assert_eq!(invoice.status, SalesInvoiceStatus::Partial);
    assert_eq!(w.ledger.outstanding(customer), Money::new(dec!(50)));

    // Overpaying the balance is rejected.
    let err = w
        .desk
        .add_payment(
            &mut w.accounts,
            &mut w.ledger,
            BranchScope::Admin,
            AddSalesPayment {
                invoice_id: invoice.id,
                amount: Money::new(dec!(60)),
                payment_method: PaymentMethod::BankTransfer,
                created_by: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, SalesError::Validation(_)));

    w.desk
        .add_payment(
            &mut w.accounts,
            &mut w.ledger,
            BranchScope::Admin,
            AddSalesPayment {
                invoice_id: invoice.id,
                amount: Money::new(dec!(50)),
                payment_method: PaymentMethod::BankTransfer,
                created_by: None,
            },
        )
        .unwrap();

    let stored = w.desk.invoice(invoice.id).unwrap();
    assert_eq!(stored.status, SalesInvoiceStatus::Paid);
    assert_eq!(w.ledger.outstanding(customer), Money::ZERO);
    assert_eq!(w.accounts.balance(w.branch, AccountType::Bank), Money::new(dec!(50)));

    // A settled invoice takes no further payments.
    let err = w
        .desk
        .add_payment(
            &mut w.accounts,
            &mut w.ledger,
            BranchScope::Admin,
            AddSalesPayment {
                invoice_id: invoice.id,
                amount: Money::new(dec!(1)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, SalesError::Validation(_)));
}

#[test]
fn branch_scope_hides_foreign_invoices() {
    let mut w = world();
    let product = w.seed_product("Soap", Money::new(dec!(3)), Quantity::new(dec!(10)), Money::new(dec!(2)));

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: None,
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(1)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(3)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    let foreign = BranchScope::Branch(BranchId::new());
    let err = w
        .desk
        .add_payment(
            &mut w.accounts,
            &mut w.ledger,
            foreign,
            AddSalesPayment {
                invoice_id: invoice.id,
                amount: Money::new(dec!(1)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, SalesError::NotFound(_)));
}

#[test]
fn full_return_refunds_and_restocks() {
    let mut w = world();
    let product = w.seed_product("Honey", Money::new(dec!(15)), Quantity::new(dec!(10)), Money::new(dec!(9)));
    let customer = w.seed_customer("Eli");

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: Some(customer),
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(8)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(120)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();
    assert_eq!(w.customers.get(customer).unwrap().loyalty_points, 1);

    let ret = w
        .desk
        .process_return(
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            BranchScope::Admin,
            CreateSalesReturn {
                invoice_id: invoice.id,
                lines: vec![ReturnLine::for_item(invoice.items[0].id, Quantity::new(dec!(8)))],
                refund_requested: None,
                refund_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    assert_eq!(ret.return_total, Money::new(dec!(120)));
    assert_eq!(ret.refund, Money::new(dec!(120)));
    assert_eq!(ret.ledger_credit, Money::ZERO);
    // Stock is back, money is gone, points are reversed.
    assert_eq!(w.stock.current_stock(product, w.branch), Quantity::new(dec!(10)));
    assert_eq!(w.accounts.balance(w.branch, AccountType::Cash), Money::ZERO);
    assert_eq!(w.customers.get(customer).unwrap().loyalty_points, 0);

    let stored = w.desk.invoice(invoice.id).unwrap();
    assert_eq!(stored.effective_total(), Money::ZERO);
    // A fully returned invoice no longer counts as paid.
    assert_eq!(stored.status, SalesInvoiceStatus::Unpaid);
}

#[test]
fn return_quantity_is_capped_across_returns() {
    let mut w = world();
    let product = w.seed_product("Jam", Money::new(dec!(5)), Quantity::new(dec!(10)), Money::new(dec!(3)));
    let customer = w.seed_customer("Fay");

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: Some(customer),
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(6)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(30)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();
    let line = invoice.items[0].id;

    w.desk
        .process_return(
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            BranchScope::Admin,
            CreateSalesReturn {
                invoice_id: invoice.id,
                lines: vec![ReturnLine::for_item(line, Quantity::new(dec!(4)))],
                refund_requested: None,
                refund_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    // Only 2 remain returnable; 3 must fail.
    let err = w
        .desk
        .process_return(
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            BranchScope::Admin,
            CreateSalesReturn {
                invoice_id: invoice.id,
                lines: vec![ReturnLine::for_item(line, Quantity::new(dec!(3)))],
                refund_requested: None,
                refund_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, SalesError::Validation(_)));
}

#[test]
fn refund_capped_at_paid_rest_goes_to_ledger() {
    let mut w = world();
    let product = w.seed_product("Flour", Money::new(dec!(10)), Quantity::new(dec!(20)), Money::new(dec!(6)));
    let customer = w.seed_customer("Gus");

    // 10 units, 100 total, only 40 paid.
    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: Some(customer),
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(10)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(40)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();
    assert_eq!(w.ledger.outstanding(customer), Money::new(dec!(60)));

    // Return 6 units worth 60; refund caps at the 40 paid.
    let ret = w
        .desk
        .process_return(
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            BranchScope::Admin,
            CreateSalesReturn {
                invoice_id: invoice.id,
                lines: vec![ReturnLine::for_item(invoice.items[0].id, Quantity::new(dec!(6)))],
                refund_requested: None,
                refund_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    assert_eq!(ret.refund, Money::new(dec!(40)));
    assert_eq!(ret.ledger_credit, Money::new(dec!(20)));
    // Outstanding was 60 debit, now minus 20 credit.
    assert_eq!(w.ledger.outstanding(customer), Money::new(dec!(40)));
    assert_eq!(w.accounts.balance(w.branch, AccountType::Cash), Money::ZERO);
}

#[test]
fn refund_fails_when_drawer_is_short() {
    let mut w = world();
    let product = w.seed_product("Sugar", Money::new(dec!(10)), Quantity::new(dec!(10)), Money::new(dec!(6)));
    let customer = w.seed_customer("Hana");

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: Some(customer),
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(5)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(50)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    // Drain the drawer so the refund cannot be covered.
    w.accounts
        .set_balances(
            w.branch,
            BranchBalances {
                cash: Money::new(dec!(10)),
                bank: Money::ZERO,
                card: Money::ZERO,
            },
        )
        .unwrap();

    let stock_before = w.stock.current_stock(product, w.branch);
    let err = w
        .desk
        .process_return(
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            BranchScope::Admin,
            CreateSalesReturn {
                invoice_id: invoice.id,
                lines: vec![ReturnLine::for_item(invoice.items[0].id, Quantity::new(dec!(5)))],
                refund_requested: None,
                refund_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap_err();

    assert!(matches!(
        err,
        SalesError::Treasury(TreasuryError::InsufficientFunds { .. })
    ));
    // Nothing restocked, drawer untouched.
    assert_eq!(w.stock.current_stock(product, w.branch), stock_before);
    assert_eq!(w.accounts.balance(w.branch, AccountType::Cash), Money::new(dec!(10)));
}

#[test]
fn line_discount_reduces_the_subtotal() {
    let mut w = world();
    let product = w.seed_product("Dates 1kg", Money::new(dec!(10)), Quantity::new(dec!(20)), Money::new(dec!(6)));

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: None,
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(5)),
                    unit_price: None,
                    discount: Money::new(dec!(8)),
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(42)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    // 5 x 10 gross, 8 off the line.
    assert_eq!(invoice.totals.subtotal, Money::new(dec!(42)));
    assert_eq!(invoice.items[0].discount, Money::new(dec!(8)));
    assert_eq!(invoice.items[0].line_total, Money::new(dec!(42)));
    assert_eq!(invoice.status, SalesInvoiceStatus::Paid);
}

#[test]
fn line_discount_cannot_exceed_the_line_amount() {
    let mut w = world();
    let product = w.seed_product("Dates 1kg", Money::new(dec!(10)), Quantity::new(dec!(20)), Money::new(dec!(6)));

    let err = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: None,
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(5)),
                    unit_price: None,
                    discount: Money::new(dec!(60)),
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::ZERO,
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap_err();

    assert!(matches!(err, SalesError::Validation(_)));
    assert_eq!(w.stock.current_stock(product, w.branch), Quantity::new(dec!(20)));
}

#[test]
fn return_line_resolves_by_product() {
    let mut w = world();
    let product = w.seed_product("Basil", Money::new(dec!(4)), Quantity::new(dec!(10)), Money::new(dec!(2)));

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: None,
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(6)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(24)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    // The caller knows the product, not the invoice line.
    let ret = w
        .desk
        .process_return(
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            BranchScope::Admin,
            CreateSalesReturn {
                invoice_id: invoice.id,
                lines: vec![ReturnLine::for_product(product, Quantity::new(dec!(2)))],
                refund_requested: None,
                refund_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    assert_eq!(ret.items[0].sales_item_id, invoice.items[0].id);
    assert_eq!(ret.return_total, Money::new(dec!(8)));
    assert_eq!(w.stock.current_stock(product, w.branch), Quantity::new(dec!(6)));
}

#[test]
fn return_line_naming_nothing_is_rejected() {
    let mut w = world();
    let product = w.seed_product("Mint", Money::new(dec!(4)), Quantity::new(dec!(10)), Money::new(dec!(2)));

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: None,
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(2)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(8)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();

    let err = w
        .desk
        .process_return(
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            BranchScope::Admin,
            CreateSalesReturn {
                invoice_id: invoice.id,
                lines: vec![ReturnLine {
                    sales_item_id: None,
                    product_id: None,
                    quantity: Quantity::new(dec!(1)),
                }],
                refund_requested: None,
                refund_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, SalesError::Validation(_)));
}

#[test]
fn duplicate_return_lines_share_one_cap() {
    let mut w = world();
    let product = w.seed_product("Cocoa", Money::new(dec!(5)), Quantity::new(dec!(20)), Money::new(dec!(3)));

    let invoice = w
        .desk
        .create_invoice(
            &w.catalog,
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            CreateSalesInvoice {
                branch_id: w.branch,
                customer_id: None,
                lines: vec![SalesLine {
                    product_id: product,
                    quantity: Quantity::new(dec!(10)),
                    unit_price: None,
                    discount: Money::ZERO,
                }],
                discount: Money::ZERO,
                tax: Money::ZERO,
                paid_amount: Money::new(dec!(50)),
                payment_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap();
    let line = invoice.items[0].id;

    // Two 6-unit lines individually fit the 10 sold, together they do not.
    let err = w
        .desk
        .process_return(
            &mut w.stock,
            &mut w.accounts,
            &mut w.customers,
            &mut w.ledger,
            BranchScope::Admin,
            CreateSalesReturn {
                invoice_id: invoice.id,
                lines: vec![
                    ReturnLine::for_item(line, Quantity::new(dec!(6))),
                    ReturnLine::for_item(line, Quantity::new(dec!(6))),
                ],
                refund_requested: None,
                refund_method: PaymentMethod::Cash,
                created_by: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, SalesError::Validation(_)));
    assert_eq!(w.stock.current_stock(product, w.branch), Quantity::new(dec!(10)));
}
