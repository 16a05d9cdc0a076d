//! Application services: load aggregates, call the ports, dispatch commands.
//!
//! Every operation computes its plan before touching a port, so a rejected
//! operation leaves products, ledger and documents unchanged.

pub mod picking;
pub mod revaluation;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use stockval_accounting::{EntryRef, JournalEntryPoster, ValuationConfig};
use stockval_core::CompanyId;
use stockval_inventory::{AuditLog, ProductCatalog, SequenceGenerator};

use crate::error::ServiceError;

pub use picking::{NewPicking, PickingValuationService};
pub use revaluation::{NewRevaluation, RevaluationService};

/// Collaborators shared by the valuation services.
#[derive(Clone)]
pub struct ValuationPorts {
    pub catalog: Arc<dyn ProductCatalog>,
    pub config: Arc<dyn ValuationConfig>,
    pub poster: Arc<dyn JournalEntryPoster>,
    pub sequences: Arc<dyn SequenceGenerator>,
    pub audit: Arc<dyn AuditLog>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Report an entry that was posted but could not be linked because the
/// document changed concurrently. The entry stays in the ledger.
fn warn_if_orphaned(err: &ServiceError, company: CompanyId, entry: &EntryRef) {
    if err.is_conflict() {
        tracing::warn!(%company, entry = %entry, error = %err, "posted entry left unlinked after a concurrent update");
    }
}
