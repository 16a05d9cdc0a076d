//! Collaborators the valuation workflows consume but do not own.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockval_core::{CompanyId, DomainResult, ProductId};

use crate::picking::PickingId;
use crate::product::Product;
use crate::revaluation::RevaluationId;

/// Sequence code of revaluation document references.
pub const REVALUATION_SEQUENCE: &str = "inventory.revaluation";

/// Products keyed by id, loaded once per operation.
pub type ProductSnapshots = HashMap<ProductId, Product>;

/// Product master data.
pub trait ProductCatalog: Send + Sync {
    /// Current state of a product for a company (quantity on hand, standard cost).
    fn product(&self, company: CompanyId, id: ProductId) -> DomainResult<Product>;

    /// Overwrite the standard cost of a product for a company.
    fn set_standard_price(&self, company: CompanyId, id: ProductId, price: Decimal) -> DomainResult<()>;
}

/// Human-readable reference generator.
pub trait SequenceGenerator: Send + Sync {
    /// Next reference for `code`, or `None` when no sequence is defined.
    fn next_by_code(&self, code: &str) -> DomainResult<Option<String>>;
}

/// Record a note is attached to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditSubject {
    Revaluation(RevaluationId),
    Picking(PickingId),
}

/// Append-only notes attached to documents.
pub trait AuditLog: Send + Sync {
    fn note(&self, company: CompanyId, subject: AuditSubject, body: String) -> DomainResult<()>;
}

/// Load each distinct product once.
pub fn load_products<C, I>(catalog: &C, company: CompanyId, ids: I) -> DomainResult<ProductSnapshots>
where
    C: ProductCatalog + ?Sized,
    I: IntoIterator<Item = ProductId>,
{
    let mut products = ProductSnapshots::new();
    for id in ids {
        if products.contains_key(&id) {
            continue;
        }
        products.insert(id, catalog.product(company, id)?);
    }
    Ok(products)
}
