use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use rust_decimal::Decimal;

use stockval_core::{CompanyId, DomainError, DomainResult, ProductId};
use stockval_inventory::{Product, ProductCatalog};

/// Product master data per company.
#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<HashMap<(CompanyId, ProductId), Product>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product.
    pub fn upsert(&self, company: CompanyId, product: Product) {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((company, product.id), product);
    }

    /// Change the quantity on hand (stock moves outside this crate).
    pub fn set_qty_available(&self, company: CompanyId, id: ProductId, qty: Decimal) -> DomainResult<()> {
        self.update(company, id, |p| p.qty_available = qty)
    }

    fn update(&self, company: CompanyId, id: ProductId, f: impl FnOnce(&mut Product)) -> DomainResult<()> {
        let mut products = self
            .products
            .write()
            .map_err(|_| DomainError::invariant("product catalog lock poisoned"))?;
        let product = products.get_mut(&(company, id)).ok_or_else(DomainError::not_found)?;
        f(product);
        Ok(())
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn product(&self, company: CompanyId, id: ProductId) -> DomainResult<Product> {
        let products = self
            .products
            .read()
            .map_err(|_| DomainError::invariant("product catalog lock poisoned"))?;
        products.get(&(company, id)).cloned().ok_or_else(DomainError::not_found)
    }

    fn set_standard_price(&self, company: CompanyId, id: ProductId, price: Decimal) -> DomainResult<()> {
        self.update(company, id, |p| p.standard_price = price)
    }
}
