//! `stockval-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the accounting and
//! inventory modules (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod money;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{
    AccountId, AggregateId, CategoryId, CompanyId, EntryId, JournalId, ProductId,
    RevaluationLineId, StockMoveId,
};
pub use money::{Currency, VALUE_EPSILON, exceeds_epsilon};
