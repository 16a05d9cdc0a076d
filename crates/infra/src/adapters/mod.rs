//! In-memory adapters for every port the valuation workflows consume.

pub mod audit;
pub mod catalog;
pub mod ledger;
pub mod sequence;
pub mod valuation_config;

pub use audit::{AuditNote, InMemoryAuditLog};
pub use catalog::InMemoryProductCatalog;
pub use ledger::EventSourcedLedger;
pub use sequence::InMemorySequenceGenerator;
pub use valuation_config::InMemoryValuationConfig;
