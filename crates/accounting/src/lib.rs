//! Accounting module (journals, journal entries, double-entry ledger).
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod analytic;
pub mod entry;
pub mod journal;
pub mod ledger;
pub mod poster;

pub use analytic::{ANALYTIC_PRECISION, AnalyticDistribution};
pub use entry::{EntryRef, JournalEntryDraft, JournalEntryLine};
pub use journal::{Journal, JournalKind, ValuationConfig, require_valuation_journal, resolve_valuation_journal};
pub use ledger::{
    JournalCommand, JournalEntryPosted, Ledger, LedgerEvent, LedgerId, PostJournalEntry,
};
pub use poster::JournalEntryPoster;
