use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockval_core::{Aggregate, AggregateId, AggregateRoot, CompanyId, DomainError, EntryId};
use stockval_events::Event;

use crate::entry::{EntryRef, JournalEntryDraft};

/// Ledger identifier (aggregate id).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerId(pub AggregateId);

impl LedgerId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LedgerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Ledger (double-entry journal of one company).
///
/// The ledger does not hold balances; it tracks identity, company and how many
/// entries were posted so entry names stay sequential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    id: LedgerId,
    company_id: Option<CompanyId>,
    posted: u64,
    version: u64,
    created: bool,
}

impl Ledger {
    /// Empty aggregate for rehydration.
    pub fn empty(id: LedgerId) -> Self {
        Self {
            id,
            company_id: None,
            posted: 0,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> LedgerId {
        self.id
    }

    pub fn company_id(&self) -> Option<CompanyId> {
        self.company_id
    }

    /// Number of entries posted so far.
    pub fn posted(&self) -> u64 {
        self.posted
    }
}

impl AggregateRoot for Ledger {
    type Id = LedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: PostJournalEntry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostJournalEntry {
    pub company_id: CompanyId,
    pub ledger_id: LedgerId,
    pub entry_id: EntryId,
    pub name: String,
    pub entry: JournalEntryDraft,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalCommand {
    PostJournalEntry(PostJournalEntry),
}

/// Event: JournalEntryPosted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryPosted {
    pub company_id: CompanyId,
    pub ledger_id: LedgerId,
    pub entry_id: EntryId,
    pub name: String,
    pub entry: JournalEntryDraft,
    pub occurred_at: DateTime<Utc>,
}

impl JournalEntryPosted {
    pub fn entry_ref(&self) -> EntryRef {
        EntryRef {
            id: self.entry_id,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    JournalEntryPosted(JournalEntryPosted),
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::JournalEntryPosted(_) => "accounting.ledger.journal_entry_posted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::JournalEntryPosted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Ledger {
    type Command = JournalCommand;
    type Event = LedgerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LedgerEvent::JournalEntryPosted(e) => {
                self.id = e.ledger_id;
                if self.company_id.is_none() {
                    self.company_id = Some(e.company_id);
                    self.created = true;
                }
                self.posted += 1;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            JournalCommand::PostJournalEntry(cmd) => self.handle_post(cmd),
        }
    }
}

impl Ledger {
    fn ensure_company(&self, company_id: CompanyId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.company_id != Some(company_id) {
            return Err(DomainError::invariant("company mismatch"));
        }
        Ok(())
    }

    fn handle_post(&self, cmd: &PostJournalEntry) -> Result<Vec<LedgerEvent>, DomainError> {
        self.ensure_company(cmd.company_id)?;

        if cmd.entry.company != cmd.company_id {
            return Err(DomainError::invariant("entry belongs to another company"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("entry name cannot be empty"));
        }
        cmd.entry.validate()?;

        Ok(vec![LedgerEvent::JournalEntryPosted(JournalEntryPosted {
            company_id: cmd.company_id,
            ledger_id: cmd.ledger_id,
            entry_id: cmd.entry_id,
            name: cmd.name.clone(),
            entry: cmd.entry.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
