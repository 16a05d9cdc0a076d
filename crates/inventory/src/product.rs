//! Product snapshots and stock-valuation account resolution.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockval_core::{AccountId, CategoryId, DomainError, DomainResult, ProductId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: CategoryId,
    pub name: String,
    /// Default stock-valuation account for products of this category.
    pub valuation_account: Option<AccountId>,
}

/// Point-in-time view of a product, as seen by the company that values it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub display_name: String,
    /// Stock-tracked good (only these are valued on pickings).
    pub storable: bool,
    pub qty_available: Decimal,
    pub standard_price: Decimal,
    /// Product-level override of the category valuation account.
    pub valuation_account: Option<AccountId>,
    pub category: ProductCategory,
}

/// Stock-valuation account of a product: product override, else category default.
pub fn valuation_account(product: &Product) -> DomainResult<AccountId> {
    product
        .valuation_account
        .or(product.category.valuation_account)
        .ok_or_else(|| {
            DomainError::missing_configuration(format!(
                "stock valuation account is not defined for product '{}' or its category '{}'",
                product.display_name, product.category.name
            ))
        })
}
