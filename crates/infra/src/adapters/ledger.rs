//! Journal-entry poster backed by the `Ledger` aggregate.

use chrono::{Datelike, Utc};

use stockval_accounting::{
    EntryRef, JournalCommand, JournalEntryDraft, JournalEntryPosted, JournalEntryPoster, Ledger,
    LedgerEvent, LedgerId, PostJournalEntry,
};
use stockval_core::{
    AggregateId, AggregateRoot, CompanyId, DomainError, DomainResult, EntryId, ExpectedVersion,
};

use crate::command_dispatcher::CommandDispatcher;
use crate::error::{ServiceError, ServiceResult};
use crate::event_store::EventStore;

pub const LEDGER_AGGREGATE: &str = "accounting.ledger";

/// One ledger stream per company; entry names are `<journal code>/<year>/<seq>`.
#[derive(Debug)]
pub struct EventSourcedLedger<S> {
    dispatcher: CommandDispatcher<S>,
}

impl<S: EventStore> EventSourcedLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(store),
        }
    }

    fn ledger_id(company: CompanyId) -> LedgerId {
        LedgerId::new(AggregateId::from_uuid(*company.as_uuid()))
    }

    /// Every entry posted for `company`, in posting order.
    pub fn posted_entries(&self, company: CompanyId) -> ServiceResult<Vec<JournalEntryPosted>> {
        let stream = self
            .dispatcher
            .store()
            .load_stream(company, Self::ledger_id(company).0)?;

        stream
            .into_iter()
            .map(|stored| -> ServiceResult<JournalEntryPosted> {
                let LedgerEvent::JournalEntryPosted(posted) = serde_json::from_value(stored.payload)
                    .map_err(|e| ServiceError::Deserialize(e.to_string()))?;
                Ok(posted)
            })
            .collect()
    }

    /// The posted entry behind `entry`, if any.
    pub fn find(&self, company: CompanyId, entry: &EntryRef) -> ServiceResult<Option<JournalEntryPosted>> {
        Ok(self
            .posted_entries(company)?
            .into_iter()
            .find(|posted| posted.entry_id == entry.id))
    }

    fn post_entry(&self, draft: JournalEntryDraft) -> ServiceResult<EntryRef> {
        let company = draft.company;
        let ledger_id = Self::ledger_id(company);
        let make = |id| Ledger::empty(LedgerId::new(id));

        let ledger = self.dispatcher.load(company, ledger_id.0, make)?;
        let name = format!(
            "{}/{}/{:04}",
            draft.journal.code,
            draft.date.year(),
            ledger.posted() + 1
        );
        let entry_id = EntryId::new();

        self.dispatcher.dispatch(
            company,
            ledger_id.0,
            LEDGER_AGGREGATE,
            JournalCommand::PostJournalEntry(PostJournalEntry {
                company_id: company,
                ledger_id,
                entry_id,
                name: name.clone(),
                entry: draft,
                occurred_at: Utc::now(),
            }),
            ExpectedVersion::Exact(ledger.version()),
            make,
        )?;

        tracing::debug!(%company, entry = %name, "journal entry posted");
        Ok(EntryRef { id: entry_id, name })
    }
}

impl<S: EventStore> JournalEntryPoster for EventSourcedLedger<S> {
    fn post(&self, draft: JournalEntryDraft) -> DomainResult<EntryRef> {
        self.post_entry(draft).map_err(|err| match err {
            ServiceError::Domain(domain) => domain,
            other if other.is_conflict() => DomainError::conflict(other.to_string()),
            other => DomainError::invariant(format!("ledger unavailable: {other}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use stockval_accounting::{Journal, JournalEntryLine, JournalKind};
    use stockval_core::{AccountId, JournalId};

    use crate::event_store::InMemoryEventStore;

    fn draft(company: CompanyId, debit: rust_decimal::Decimal, credit: rust_decimal::Decimal) -> JournalEntryDraft {
        JournalEntryDraft {
            journal: Journal {
                id: JournalId::new(),
                company,
                code: "STJ".to_string(),
                name: "Inventory Valuation".to_string(),
                kind: JournalKind::General,
            },
            company,
            date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            reference: "REV/00001".to_string(),
            lines: vec![
                JournalEntryLine::debit("REV/00001 - Desk", AccountId::new(), debit),
                JournalEntryLine::credit("REV/00001 - Desk", AccountId::new(), credit),
            ],
        }
    }

    #[test]
    fn names_entries_sequentially_per_company() {
        let ledger = EventSourcedLedger::new(InMemoryEventStore::new());
        let company = CompanyId::new();

        let first = ledger.post(draft(company, dec!(30), dec!(30))).unwrap();
        let second = ledger.post(draft(company, dec!(5), dec!(5))).unwrap();
        let other = ledger.post(draft(CompanyId::new(), dec!(1), dec!(1))).unwrap();

        assert_eq!(first.name, "STJ/2026/0001");
        assert_eq!(second.name, "STJ/2026/0002");
        assert_eq!(other.name, "STJ/2026/0001");

        let posted = ledger.posted_entries(company).unwrap();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[1].entry_ref(), second);
        assert!(ledger.find(company, &first).unwrap().is_some());
    }

    #[test]
    fn unbalanced_draft_is_rejected_and_nothing_is_stored() {
        let ledger = EventSourcedLedger::new(InMemoryEventStore::new());
        let company = CompanyId::new();

        let err = ledger.post(draft(company, dec!(30), dec!(29))).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert!(ledger.posted_entries(company).unwrap().is_empty());
    }
}
