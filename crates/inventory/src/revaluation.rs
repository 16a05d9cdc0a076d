//! Manual inventory revaluation at a new standard cost.
//!
//! A document starts in draft, where every line is evaluated against the live
//! product state. Confirming it freezes those values into a snapshot, posts a
//! balancing entry built from the snapshot and moves it to `posted`. From then
//! on only the snapshot is read, so later stock or cost changes never alter a
//! posted document's figures.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockval_accounting::{EntryRef, Journal, JournalEntryDraft, JournalEntryLine, require_valuation_journal};
use stockval_core::{
    AccountId, Aggregate, AggregateId, AggregateRoot, CompanyId, Currency, DomainError,
    DomainResult, JournalId, ProductId, RevaluationLineId, exceeds_epsilon,
};
use stockval_events::Event;

use crate::ports::ProductSnapshots;
use crate::product::{Product, valuation_account};

/// Revaluation document identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevaluationId(pub AggregateId);

impl RevaluationId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for RevaluationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevaluationState {
    Draft,
    Posted,
    Cancelled,
}

/// `qty × (new_cost − current_cost)`.
pub fn value_change(qty: Decimal, current_cost: Decimal, new_cost: Decimal) -> Decimal {
    qty * (new_cost - current_cost)
}

/// Editable line of a draft document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevaluationLine {
    pub id: RevaluationLineId,
    pub product_id: ProductId,
    pub counterpart_account: Option<AccountId>,
    pub new_cost: Decimal,
}

impl RevaluationLine {
    /// Evaluate the line against the current product state.
    pub fn live(&self, product: &Product) -> LiveLine {
        LiveLine {
            line: self.clone(),
            qty_on_hand: product.qty_available,
            current_cost: product.standard_price,
            value_change: value_change(product.qty_available, product.standard_price, self.new_cost),
        }
    }
}

/// A draft line with its live-computed figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveLine {
    pub line: RevaluationLine,
    pub qty_on_hand: Decimal,
    pub current_cost: Decimal,
    pub value_change: Decimal,
}

/// Write-once copy of a line's figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenLine {
    pub line_id: RevaluationLineId,
    pub product_id: ProductId,
    pub counterpart_account: Option<AccountId>,
    pub qty: Decimal,
    pub current_cost: Decimal,
    pub new_cost: Decimal,
    pub value_change: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenSnapshot {
    pub lines: Vec<FrozenLine>,
    pub total_value_change: Decimal,
}

impl FrozenSnapshot {
    pub fn freeze(live: &[LiveLine]) -> Self {
        let lines: Vec<FrozenLine> = live
            .iter()
            .map(|l| FrozenLine {
                line_id: l.line.id,
                product_id: l.line.product_id,
                counterpart_account: l.line.counterpart_account,
                qty: l.qty_on_hand,
                current_cost: l.current_cost,
                new_cost: l.line.new_cost,
                value_change: l.value_change,
            })
            .collect();
        let total_value_change = lines.iter().map(|l| l.value_change).sum();
        Self {
            lines,
            total_value_change,
        }
    }

    fn covers(&self, lines: &[RevaluationLine]) -> bool {
        self.lines.len() == lines.len()
            && self
                .lines
                .iter()
                .zip(lines)
                .all(|(f, l)| f.line_id == l.id && f.product_id == l.product_id)
    }
}

/// Everything a confirmation produces before any collaborator is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPlan {
    pub journal_id: JournalId,
    pub snapshot: FrozenSnapshot,
    pub entry: JournalEntryDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Draft {
        lines: Vec<RevaluationLine>,
    },
    Posted {
        snapshot: FrozenSnapshot,
        entry: EntryRef,
    },
    Cancelled {
        snapshot: FrozenSnapshot,
        entry: Option<EntryRef>,
    },
}

/// Aggregate root: InventoryRevaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRevaluation {
    id: RevaluationId,
    company_id: Option<CompanyId>,
    reference: String,
    date: NaiveDate,
    journal_id: Option<JournalId>,
    status: Status,
    version: u64,
    created: bool,
}

impl InventoryRevaluation {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: RevaluationId) -> Self {
        Self {
            id,
            company_id: None,
            reference: String::new(),
            date: NaiveDate::default(),
            journal_id: None,
            status: Status::Draft { lines: Vec::new() },
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> RevaluationId {
        self.id
    }

    pub fn company_id(&self) -> Option<CompanyId> {
        self.company_id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn journal_id(&self) -> Option<JournalId> {
        self.journal_id
    }

    pub fn exists(&self) -> bool {
        self.created
    }

    pub fn state(&self) -> RevaluationState {
        match self.status {
            Status::Draft { .. } => RevaluationState::Draft,
            Status::Posted { .. } => RevaluationState::Posted,
            Status::Cancelled { .. } => RevaluationState::Cancelled,
        }
    }

    /// Editable lines; empty once the document left draft.
    pub fn draft_lines(&self) -> &[RevaluationLine] {
        match &self.status {
            Status::Draft { lines } => lines,
            _ => &[],
        }
    }

    /// Frozen figures; `None` while in draft.
    pub fn snapshot(&self) -> Option<&FrozenSnapshot> {
        match &self.status {
            Status::Draft { .. } => None,
            Status::Posted { snapshot, .. } | Status::Cancelled { snapshot, .. } => Some(snapshot),
        }
    }

    /// Journal entry of a posted document; `None` in any other state.
    pub fn entry(&self) -> Option<&EntryRef> {
        match &self.status {
            Status::Posted { entry, .. } => Some(entry),
            Status::Draft { .. } | Status::Cancelled { .. } => None,
        }
    }

    /// Entry a cancelled document posted before it was cancelled. It is not
    /// reversed.
    pub fn kept_entry(&self) -> Option<&EntryRef> {
        match &self.status {
            Status::Cancelled { entry, .. } => entry.as_ref(),
            Status::Draft { .. } | Status::Posted { .. } => None,
        }
    }

    /// Live lines in draft; empty otherwise.
    pub fn live_lines(&self, products: &ProductSnapshots) -> DomainResult<Vec<LiveLine>> {
        self.draft_lines()
            .iter()
            .map(|line| {
                let product = products.get(&line.product_id).ok_or_else(|| {
                    DomainError::precondition(format!("product {} is not available", line.product_id))
                })?;
                Ok(line.live(product))
            })
            .collect()
    }

    /// Live sum in draft, stored total afterwards.
    pub fn total_value_change(&self, products: &ProductSnapshots) -> DomainResult<Decimal> {
        match self.snapshot() {
            Some(snapshot) => Ok(snapshot.total_value_change),
            None => Ok(self.live_lines(products)?.iter().map(|l| l.value_change).sum()),
        }
    }

    /// Validate, freeze and build the balancing entry without mutating anything.
    pub fn plan_confirmation(
        &self,
        journal: Option<&Journal>,
        products: &ProductSnapshots,
        currency: &Currency,
    ) -> DomainResult<ConfirmationPlan> {
        self.ensure_draft("only draft documents can be confirmed")?;
        let live = self.live_lines(products)?;
        self.validate_before_post(journal, &live)?;

        let journal = require_valuation_journal(journal)?;
        let snapshot = FrozenSnapshot::freeze(&live);
        let entry = self.build_entry(journal, &snapshot, products, currency)?;

        Ok(ConfirmationPlan {
            journal_id: journal.id,
            snapshot,
            entry,
        })
    }

    fn validate_before_post(&self, journal: Option<&Journal>, live: &[LiveLine]) -> DomainResult<()> {
        require_valuation_journal(journal)?;

        if live.is_empty() {
            return Err(DomainError::precondition(
                "add at least one line to confirm the revaluation",
            ));
        }
        if live.iter().any(|l| l.line.counterpart_account.is_none()) {
            return Err(DomainError::precondition(
                "every line needs a counterpart account",
            ));
        }
        if !live.iter().any(|l| exceeds_epsilon(l.value_change)) {
            return Err(DomainError::no_effect("the new costs do not change any value"));
        }
        Ok(())
    }

    fn build_entry(
        &self,
        journal: &Journal,
        snapshot: &FrozenSnapshot,
        products: &ProductSnapshots,
        currency: &Currency,
    ) -> DomainResult<JournalEntryDraft> {
        let company = self.company_id.ok_or_else(DomainError::not_found)?;
        let mut lines = Vec::with_capacity(snapshot.lines.len() * 2);

        for frozen in &snapshot.lines {
            let amount = currency.round(frozen.value_change);
            if !exceeds_epsilon(amount) {
                continue;
            }

            let product = products.get(&frozen.product_id).ok_or_else(|| {
                DomainError::precondition(format!("product {} is not available", frozen.product_id))
            })?;
            let valuation = valuation_account(product)?;
            let counterpart = frozen
                .counterpart_account
                .ok_or_else(|| DomainError::precondition("every line needs a counterpart account"))?;
            let label = format!("{} - {}", self.reference, product.display_name);

            let (valuation_line, counterpart_line) = if amount > Decimal::ZERO {
                (
                    JournalEntryLine::debit(label.clone(), valuation, amount),
                    JournalEntryLine::credit(label, counterpart, amount),
                )
            } else {
                let amount = amount.abs();
                (
                    JournalEntryLine::credit(label.clone(), valuation, amount),
                    JournalEntryLine::debit(label, counterpart, amount),
                )
            };
            lines.push(valuation_line.for_product(product.id));
            lines.push(counterpart_line.for_product(product.id));
        }

        if lines.is_empty() {
            return Err(DomainError::no_effect(
                "no accounting lines were generated; nothing to confirm",
            ));
        }

        Ok(JournalEntryDraft {
            journal: journal.clone(),
            company,
            date: self.date,
            reference: self.reference.clone(),
            lines,
        })
    }
}

impl AggregateRoot for InventoryRevaluation {
    type Id = RevaluationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateRevaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRevaluation {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub reference: String,
    pub date: NaiveDate,
    pub journal_id: Option<JournalId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLine {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub line: RevaluationLine,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateLine. `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLine {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub line_id: RevaluationLineId,
    pub new_cost: Option<Decimal>,
    pub counterpart_account: Option<AccountId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLine {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub line_id: RevaluationLineId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmRevaluation (the entry is already posted by the caller).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmRevaluation {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub journal_id: JournalId,
    pub snapshot: FrozenSnapshot,
    pub entry: EntryRef,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelRevaluation.
///
/// `snapshot` must carry the live figures when the document is still in draft;
/// it is ignored for posted documents, which keep their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRevaluation {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub snapshot: Option<FrozenSnapshot>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevaluationCommand {
    Create(CreateRevaluation),
    AddLine(AddLine),
    UpdateLine(UpdateLine),
    RemoveLine(RemoveLine),
    Confirm(ConfirmRevaluation),
    Cancel(CancelRevaluation),
}

/// Event: RevaluationCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevaluationCreated {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub reference: String,
    pub date: NaiveDate,
    pub journal_id: Option<JournalId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAdded {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub line: RevaluationLine,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineUpdated {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub line_id: RevaluationLineId,
    pub new_cost: Option<Decimal>,
    pub counterpart_account: Option<AccountId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRemoved {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub line_id: RevaluationLineId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RevaluationPosted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevaluationPosted {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub journal_id: JournalId,
    pub snapshot: FrozenSnapshot,
    pub entry: EntryRef,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RevaluationCancelled.
///
/// `frozen` is set when the document was frozen by the cancellation itself;
/// `kept_entry` names an entry that stays posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevaluationCancelled {
    pub company_id: CompanyId,
    pub revaluation_id: RevaluationId,
    pub frozen: Option<FrozenSnapshot>,
    pub kept_entry: Option<EntryRef>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevaluationEvent {
    Created(RevaluationCreated),
    LineAdded(LineAdded),
    LineUpdated(LineUpdated),
    LineRemoved(LineRemoved),
    Posted(RevaluationPosted),
    Cancelled(RevaluationCancelled),
}

impl Event for RevaluationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RevaluationEvent::Created(_) => "inventory.revaluation.created",
            RevaluationEvent::LineAdded(_) => "inventory.revaluation.line_added",
            RevaluationEvent::LineUpdated(_) => "inventory.revaluation.line_updated",
            RevaluationEvent::LineRemoved(_) => "inventory.revaluation.line_removed",
            RevaluationEvent::Posted(_) => "inventory.revaluation.posted",
            RevaluationEvent::Cancelled(_) => "inventory.revaluation.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RevaluationEvent::Created(e) => e.occurred_at,
            RevaluationEvent::LineAdded(e) => e.occurred_at,
            RevaluationEvent::LineUpdated(e) => e.occurred_at,
            RevaluationEvent::LineRemoved(e) => e.occurred_at,
            RevaluationEvent::Posted(e) => e.occurred_at,
            RevaluationEvent::Cancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for InventoryRevaluation {
    type Command = RevaluationCommand;
    type Event = RevaluationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            RevaluationEvent::Created(e) => {
                self.id = e.revaluation_id;
                self.company_id = Some(e.company_id);
                self.reference = e.reference.clone();
                self.date = e.date;
                self.journal_id = e.journal_id;
                self.status = Status::Draft { lines: Vec::new() };
                self.created = true;
            }
            RevaluationEvent::LineAdded(e) => {
                if let Status::Draft { lines } = &mut self.status {
                    lines.push(e.line.clone());
                }
            }
            RevaluationEvent::LineUpdated(e) => {
                if let Status::Draft { lines } = &mut self.status {
                    if let Some(line) = lines.iter_mut().find(|l| l.id == e.line_id) {
                        if let Some(cost) = e.new_cost {
                            line.new_cost = cost;
                        }
                        if let Some(account) = e.counterpart_account {
                            line.counterpart_account = Some(account);
                        }
                    }
                }
            }
            RevaluationEvent::LineRemoved(e) => {
                if let Status::Draft { lines } = &mut self.status {
                    lines.retain(|l| l.id != e.line_id);
                }
            }
            RevaluationEvent::Posted(e) => {
                self.journal_id = Some(e.journal_id);
                self.status = Status::Posted {
                    snapshot: e.snapshot.clone(),
                    entry: e.entry.clone(),
                };
            }
            RevaluationEvent::Cancelled(e) => {
                let previous = std::mem::replace(&mut self.status, Status::Draft { lines: Vec::new() });
                self.status = match previous {
                    Status::Draft { .. } => Status::Cancelled {
                        snapshot: e.frozen.clone().unwrap_or_default(),
                        entry: None,
                    },
                    Status::Posted { snapshot, entry } => Status::Cancelled {
                        snapshot,
                        entry: Some(entry),
                    },
                    cancelled @ Status::Cancelled { .. } => cancelled,
                };
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            RevaluationCommand::Create(cmd) => self.handle_create(cmd),
            RevaluationCommand::AddLine(cmd) => self.handle_add_line(cmd),
            RevaluationCommand::UpdateLine(cmd) => self.handle_update_line(cmd),
            RevaluationCommand::RemoveLine(cmd) => self.handle_remove_line(cmd),
            RevaluationCommand::Confirm(cmd) => self.handle_confirm(cmd),
            RevaluationCommand::Cancel(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl InventoryRevaluation {
    fn ensure_existing(&self, company_id: CompanyId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.company_id != Some(company_id) {
            return Err(DomainError::invariant("company mismatch"));
        }
        Ok(())
    }

    fn ensure_draft(&self, msg: &str) -> Result<(), DomainError> {
        match self.status {
            Status::Draft { .. } => Ok(()),
            _ => Err(DomainError::precondition(msg)),
        }
    }

    fn handle_create(&self, cmd: &CreateRevaluation) -> Result<Vec<RevaluationEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("revaluation already exists"));
        }
        if cmd.reference.trim().is_empty() {
            return Err(DomainError::validation("reference cannot be empty"));
        }
        Ok(vec![RevaluationEvent::Created(RevaluationCreated {
            company_id: cmd.company_id,
            revaluation_id: cmd.revaluation_id,
            reference: cmd.reference.clone(),
            date: cmd.date,
            journal_id: cmd.journal_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_line(&self, cmd: &AddLine) -> Result<Vec<RevaluationEvent>, DomainError> {
        self.ensure_existing(cmd.company_id)?;
        self.ensure_draft("only draft documents can be edited")?;

        if self.draft_lines().iter().any(|l| l.id == cmd.line.id) {
            return Err(DomainError::conflict("line already exists"));
        }
        if cmd.line.new_cost < Decimal::ZERO {
            return Err(DomainError::validation("new cost cannot be negative"));
        }

        Ok(vec![RevaluationEvent::LineAdded(LineAdded {
            company_id: cmd.company_id,
            revaluation_id: cmd.revaluation_id,
            line: cmd.line.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_line(&self, cmd: &UpdateLine) -> Result<Vec<RevaluationEvent>, DomainError> {
        self.ensure_existing(cmd.company_id)?;
        self.ensure_draft("only draft documents can be edited")?;

        if !self.draft_lines().iter().any(|l| l.id == cmd.line_id) {
            return Err(DomainError::not_found());
        }
        if cmd.new_cost.is_some_and(|c| c < Decimal::ZERO) {
            return Err(DomainError::validation("new cost cannot be negative"));
        }

        Ok(vec![RevaluationEvent::LineUpdated(LineUpdated {
            company_id: cmd.company_id,
            revaluation_id: cmd.revaluation_id,
            line_id: cmd.line_id,
            new_cost: cmd.new_cost,
            counterpart_account: cmd.counterpart_account,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_line(&self, cmd: &RemoveLine) -> Result<Vec<RevaluationEvent>, DomainError> {
        self.ensure_existing(cmd.company_id)?;
        self.ensure_draft("only draft documents can be edited")?;

        if !self.draft_lines().iter().any(|l| l.id == cmd.line_id) {
            return Err(DomainError::not_found());
        }

        Ok(vec![RevaluationEvent::LineRemoved(LineRemoved {
            company_id: cmd.company_id,
            revaluation_id: cmd.revaluation_id,
            line_id: cmd.line_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmRevaluation) -> Result<Vec<RevaluationEvent>, DomainError> {
        self.ensure_existing(cmd.company_id)?;
        self.ensure_draft("only draft documents can be confirmed")?;

        if !cmd.snapshot.covers(self.draft_lines()) {
            return Err(DomainError::invariant("snapshot does not match the document lines"));
        }

        Ok(vec![RevaluationEvent::Posted(RevaluationPosted {
            company_id: cmd.company_id,
            revaluation_id: cmd.revaluation_id,
            journal_id: cmd.journal_id,
            snapshot: cmd.snapshot.clone(),
            entry: cmd.entry.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelRevaluation) -> Result<Vec<RevaluationEvent>, DomainError> {
        self.ensure_existing(cmd.company_id)?;

        let (frozen, kept_entry) = match &self.status {
            Status::Cancelled { .. } => {
                return Err(DomainError::precondition("document is already cancelled"));
            }
            Status::Draft { lines } => {
                let snapshot = cmd.snapshot.as_ref().ok_or_else(|| {
                    DomainError::precondition("a draft must be frozen before it is cancelled")
                })?;
                if !snapshot.covers(lines) {
                    return Err(DomainError::invariant("snapshot does not match the document lines"));
                }
                (Some(snapshot.clone()), None)
            }
            Status::Posted { entry, .. } => (None, Some(entry.clone())),
        };

        Ok(vec![RevaluationEvent::Cancelled(RevaluationCancelled {
            company_id: cmd.company_id,
            revaluation_id: cmd.revaluation_id,
            frozen,
            kept_entry,
            occurred_at: cmd.occurred_at,
        })])
    }
}
