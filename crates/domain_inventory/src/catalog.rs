//! Product catalog
//!
//! Products are either company-wide (no branch) or owned by a single branch.
//! Selling operations resolve products through the catalog so inactive or
//! out-of-scope products are rejected before any stock moves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{BranchId, CompanyId, Money, ProductId};

use crate::error::InventoryError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub company_id: CompanyId,
    /// None means the product is visible to every branch
    pub branch_id: Option<BranchId>,
    pub name: String,
    pub sku: Option<String>,
    /// Default selling price, used when a sale line does not override it
    pub sell_price: Money,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(company_id: CompanyId, name: impl Into<String>, sell_price: Money) -> Self {
        Self {
            id: ProductId::new_v7(),
            company_id,
            branch_id: None,
            name: name.into(),
            sku: None,
            sell_price,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn for_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Whether the product is sellable at `branch`.
    pub fn visible_at(&self, branch: BranchId) -> bool {
        self.branch_id.map(|own| own == branch).unwrap_or(true)
    }
}

/// Lookup table of products keyed by id.
#[derive(Debug, Default)]
pub struct ProductCatalog {
    products: HashMap<ProductId, Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, product: Product) -> ProductId {
        let id = product.id;
        self.products.insert(id, product);
        id
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn deactivate(&mut self, id: ProductId) -> Result<(), InventoryError> {
        let product = self
            .products
            .get_mut(&id)
            .ok_or_else(|| InventoryError::not_found(format!("product {id}")))?;
        product.active = false;
        Ok(())
    }

    /// Resolves a product for use at a branch.
    ///
    /// # Errors
    ///
    /// - Unknown or out-of-scope products come back as not found
    /// - Inactive products fail validation
    pub fn expect_sellable(
        &self,
        id: ProductId,
        branch: BranchId,
    ) -> Result<&Product, InventoryError> {
        let product = self
            .products
            .get(&id)
            .filter(|p| p.visible_at(branch))
            .ok_or_else(|| InventoryError::not_found(format!("product {id}")))?;
        if !product.active {
            return Err(InventoryError::validation(format!(
                "product {} is inactive",
                product.name
            )));
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_company_wide_product_visible_everywhere() {
        let mut catalog = ProductCatalog::new();
        let id = catalog.add(Product::new(CompanyId::new(), "Rice 5kg", Money::new(dec!(12))));
        assert!(catalog.expect_sellable(id, BranchId::new()).is_ok());
    }

    #[test]
    fn test_branch_product_hidden_elsewhere() {
        let mut catalog = ProductCatalog::new();
        let home = BranchId::new();
        let id = catalog.add(
            Product::new(CompanyId::new(), "Local item", Money::new(dec!(3))).for_branch(home),
        );

        assert!(catalog.expect_sellable(id, home).is_ok());
        let err = catalog.expect_sellable(id, BranchId::new()).unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[test]
    fn test_inactive_product_rejected() {
        let mut catalog = ProductCatalog::new();
        let id = catalog.add(Product::new(CompanyId::new(), "Old stock", Money::new(dec!(1))));
        catalog.deactivate(id).unwrap();

        let err = catalog.expect_sellable(id, BranchId::new()).unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }
}
