//! Test Data Builders
//!
//! Builder patterns for constructing test inputs with sensible defaults.
//! Tests specify only the fields they care about; names come from `fake`
//! so seeded data reads like real shop data in failure output.

use chrono::NaiveDate;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal_macros::dec;

use core_kernel::{BranchId, CustomerId, Money, ProductId, Quantity};
use domain_billing::Customer;
use domain_inventory::{NewBatch, Product};
use domain_purchasing::{CreatePurchaseInvoice, PurchaseLine};
use domain_sales::{CreateSalesInvoice, SalesLine};
use domain_treasury::PaymentMethod;

use crate::fixtures::IdFixtures;

/// Builder for catalog products
pub struct ProductBuilder {
    name: String,
    sell_price: Money,
    sku: Option<String>,
    branch_id: Option<BranchId>,
}

impl Default for ProductBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductBuilder {
    pub fn new() -> Self {
        Self {
            name: Word().fake(),
            sell_price: Money::new(dec!(10.00)),
            sku: None,
            branch_id: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn priced(mut self, sell_price: Money) -> Self {
        self.sell_price = sell_price;
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Restricts the product to a single branch
    pub fn at_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn build(self) -> Product {
        let mut product = Product::new(IdFixtures::company(), self.name, self.sell_price);
        if let Some(sku) = self.sku {
            product = product.with_sku(sku);
        }
        if let Some(branch) = self.branch_id {
            product = product.for_branch(branch);
        }
        product
    }
}

/// Builder for customers
pub struct CustomerBuilder {
    name: String,
    branch_id: Option<BranchId>,
}

impl Default for CustomerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerBuilder {
    pub fn new() -> Self {
        Self {
            name: Name().fake(),
            branch_id: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn build(self) -> Customer {
        let mut customer = Customer::new(IdFixtures::company(), self.name);
        if let Some(branch) = self.branch_id {
            customer = customer.for_branch(branch);
        }
        customer
    }
}

/// Builder for stock batches
pub struct BatchBuilder {
    product_id: ProductId,
    branch_id: BranchId,
    quantity: Quantity,
    unit_cost: Money,
    sell_price: Money,
    batch_number: String,
    expiry_date: Option<NaiveDate>,
}

impl BatchBuilder {
    pub fn new(product_id: ProductId, branch_id: BranchId) -> Self {
        Self {
            product_id,
            branch_id,
            quantity: Quantity::new(dec!(10)),
            unit_cost: Money::new(dec!(6.00)),
            sell_price: Money::new(dec!(10.00)),
            batch_number: "BAT-TEST".to_string(),
            expiry_date: None,
        }
    }

    pub fn quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn unit_cost(mut self, unit_cost: Money) -> Self {
        self.unit_cost = unit_cost;
        self
    }

    pub fn sell_price(mut self, sell_price: Money) -> Self {
        self.sell_price = sell_price;
        self
    }

    pub fn numbered(mut self, batch_number: impl Into<String>) -> Self {
        self.batch_number = batch_number.into();
        self
    }

    pub fn expiring(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    pub fn build(self) -> NewBatch {
        NewBatch {
            product_id: self.product_id,
            branch_id: self.branch_id,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            sell_price: self.sell_price,
            batch_number: self.batch_number,
            expiry_date: self.expiry_date,
            purchase_item_id: None,
        }
    }
}

/// Builder for sales invoice inputs
pub struct SalesInvoiceBuilder {
    branch_id: BranchId,
    customer_id: Option<CustomerId>,
    lines: Vec<SalesLine>,
    discount: Money,
    tax: Money,
    paid_amount: Money,
    payment_method: PaymentMethod,
}

impl SalesInvoiceBuilder {
    pub fn new(branch_id: BranchId) -> Self {
        Self {
            branch_id,
            customer_id: None,
            lines: Vec::new(),
            discount: Money::ZERO,
            tax: Money::ZERO,
            paid_amount: Money::ZERO,
            payment_method: PaymentMethod::Cash,
        }
    }

    pub fn for_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Adds a line at the catalog price
    pub fn line(mut self, product_id: ProductId, quantity: Quantity) -> Self {
        self.lines.push(SalesLine {
            product_id,
            quantity,
            unit_price: None,
            discount: Money::ZERO,
        });
        self
    }

    /// Adds a line at an overridden price
    pub fn line_at(mut self, product_id: ProductId, quantity: Quantity, price: Money) -> Self {
        self.lines.push(SalesLine {
            product_id,
            quantity,
            unit_price: Some(price),
            discount: Money::ZERO,
        });
        self
    }

    /// Adds a line at the catalog price with a line discount
    pub fn discounted_line(
        mut self,
        product_id: ProductId,
        quantity: Quantity,
        discount: Money,
    ) -> Self {
        self.lines.push(SalesLine {
            product_id,
            quantity,
            unit_price: None,
            discount,
        });
        self
    }

    pub fn discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    pub fn tax(mut self, tax: Money) -> Self {
        self.tax = tax;
        self
    }

    pub fn paying(mut self, amount: Money, method: PaymentMethod) -> Self {
        self.paid_amount = amount;
        self.payment_method = method;
        self
    }

    pub fn build(self) -> CreateSalesInvoice {
        CreateSalesInvoice {
            branch_id: self.branch_id,
            customer_id: self.customer_id,
            lines: self.lines,
            discount: self.discount,
            tax: self.tax,
            paid_amount: self.paid_amount,
            payment_method: self.payment_method,
            created_by: None,
        }
    }
}

/// Builder for purchase invoice inputs
pub struct PurchaseInvoiceBuilder {
    branch_id: BranchId,
    lines: Vec<PurchaseLine>,
    discount: Money,
    tax: Money,
    paid_amount: Money,
    payment_method: PaymentMethod,
}

impl PurchaseInvoiceBuilder {
    pub fn new(branch_id: BranchId) -> Self {
        Self {
            branch_id,
            lines: Vec::new(),
            discount: Money::ZERO,
            tax: Money::ZERO,
            paid_amount: Money::ZERO,
            payment_method: PaymentMethod::Cash,
        }
    }

    pub fn line(mut self, product_id: ProductId, quantity: Quantity, unit_cost: Money) -> Self {
        self.lines.push(PurchaseLine {
            product_id,
            quantity,
            unit_cost,
            discount: Money::ZERO,
            sell_price: None,
            expiry_date: None,
            batch_number: None,
        });
        self
    }

    /// Adds a line carrying a supplier discount
    pub fn discounted_line(
        mut self,
        product_id: ProductId,
        quantity: Quantity,
        unit_cost: Money,
        discount: Money,
    ) -> Self {
        self.lines.push(PurchaseLine {
            product_id,
            quantity,
            unit_cost,
            discount,
            sell_price: None,
            expiry_date: None,
            batch_number: None,
        });
        self
    }

    /// Adds a line whose batch carries an expiry date
    pub fn perishable_line(
        mut self,
        product_id: ProductId,
        quantity: Quantity,
        unit_cost: Money,
        expiry: NaiveDate,
    ) -> Self {
        self.lines.push(PurchaseLine {
            product_id,
            quantity,
            unit_cost,
            discount: Money::ZERO,
            sell_price: None,
            expiry_date: Some(expiry),
            batch_number: None,
        });
        self
    }

    pub fn discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    pub fn tax(mut self, tax: Money) -> Self {
        self.tax = tax;
        self
    }

    pub fn paying(mut self, amount: Money, method: PaymentMethod) -> Self {
        self.paid_amount = amount;
        self.payment_method = method;
        self
    }

    pub fn build(self) -> CreatePurchaseInvoice {
        CreatePurchaseInvoice {
            branch_id: self.branch_id,
            supplier_id: None,
            lines: self.lines,
            discount: self.discount,
            tax: self.tax,
            paid_amount: self.paid_amount,
            payment_method: self.payment_method,
            created_by: None,
        }
    }
}
