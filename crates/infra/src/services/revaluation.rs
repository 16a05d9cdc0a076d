use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use stockval_accounting::{EntryRef, resolve_valuation_journal};
use stockval_core::{
    AccountId, AggregateId, AggregateRoot, CompanyId, Currency, DomainError, ExpectedVersion,
    ProductId, RevaluationLineId,
};
use stockval_inventory::{
    AddLine, AuditSubject, CancelRevaluation, ConfirmRevaluation, CreateRevaluation, FrozenSnapshot,
    InventoryRevaluation, LiveLine, REVALUATION_SEQUENCE, RemoveLine, RevaluationCommand,
    RevaluationId, RevaluationLine, RevaluationState, UpdateLine, load_products,
};

use super::{ValuationPorts, today, warn_if_orphaned};
use crate::command_dispatcher::CommandDispatcher;
use crate::error::ServiceResult;
use crate::event_store::EventStore;

pub const REVALUATION_AGGREGATE: &str = "inventory.revaluation";

/// Header of a new revaluation document.
#[derive(Debug, Clone, Default)]
pub struct NewRevaluation {
    /// Caller-chosen reference; the revaluation sequence is used otherwise.
    pub reference: Option<String>,
    /// Accounting date; today otherwise.
    pub date: Option<NaiveDate>,
}

/// Draft editing, confirmation and cancellation of revaluation documents.
pub struct RevaluationService<S> {
    dispatcher: CommandDispatcher<S>,
    ports: ValuationPorts,
    currency: Currency,
}

impl<S: EventStore> RevaluationService<S> {
    pub fn new(store: S, ports: ValuationPorts, currency: Currency) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(store),
            ports,
            currency,
        }
    }

    pub fn create(&self, company: CompanyId, header: NewRevaluation) -> ServiceResult<InventoryRevaluation> {
        let id = RevaluationId::new(AggregateId::new());
        let reference = match header.reference {
            Some(reference) => reference,
            None => self
                .ports
                .sequences
                .next_by_code(REVALUATION_SEQUENCE)?
                .unwrap_or_else(|| "New".to_string()),
        };
        let journal_id = resolve_valuation_journal(self.ports.config.as_ref(), company).map(|j| j.id);

        let command = RevaluationCommand::Create(CreateRevaluation {
            company_id: company,
            revaluation_id: id,
            reference,
            date: header.date.unwrap_or_else(today),
            journal_id,
            occurred_at: Utc::now(),
        });
        let created = self.dispatch(company, id, command, ExpectedVersion::Exact(0))?;

        tracing::info!(%company, revaluation = %id, reference = created.reference(), "revaluation created");
        Ok(created)
    }

    pub fn get(&self, company: CompanyId, id: RevaluationId) -> ServiceResult<InventoryRevaluation> {
        let revaluation = self
            .dispatcher
            .load(company, id.0, |a| InventoryRevaluation::empty(RevaluationId::new(a)))?;
        if !revaluation.exists() {
            return Err(DomainError::not_found().into());
        }
        Ok(revaluation)
    }

    /// Add a line for `product`; the product must exist in the catalog.
    pub fn add_line(
        &self,
        company: CompanyId,
        id: RevaluationId,
        product: ProductId,
        new_cost: Decimal,
        counterpart_account: Option<AccountId>,
    ) -> ServiceResult<RevaluationLineId> {
        self.ports.catalog.product(company, product)?;

        let line = RevaluationLine {
            id: RevaluationLineId::new(),
            product_id: product,
            counterpart_account,
            new_cost,
        };
        let line_id = line.id;
        let command = RevaluationCommand::AddLine(AddLine {
            company_id: company,
            revaluation_id: id,
            line,
            occurred_at: Utc::now(),
        });
        self.dispatch(company, id, command, ExpectedVersion::Any)?;
        Ok(line_id)
    }

    pub fn update_line(
        &self,
        company: CompanyId,
        id: RevaluationId,
        line_id: RevaluationLineId,
        new_cost: Option<Decimal>,
        counterpart_account: Option<AccountId>,
    ) -> ServiceResult<()> {
        let command = RevaluationCommand::UpdateLine(UpdateLine {
            company_id: company,
            revaluation_id: id,
            line_id,
            new_cost,
            counterpart_account,
            occurred_at: Utc::now(),
        });
        self.dispatch(company, id, command, ExpectedVersion::Any)?;
        Ok(())
    }

    pub fn remove_line(&self, company: CompanyId, id: RevaluationId, line_id: RevaluationLineId) -> ServiceResult<()> {
        let command = RevaluationCommand::RemoveLine(RemoveLine {
            company_id: company,
            revaluation_id: id,
            line_id,
            occurred_at: Utc::now(),
        });
        self.dispatch(company, id, command, ExpectedVersion::Any)?;
        Ok(())
    }

    /// Lines with their live quantity, current cost and value change.
    pub fn live_lines(&self, company: CompanyId, id: RevaluationId) -> ServiceResult<Vec<LiveLine>> {
        let revaluation = self.get(company, id)?;
        let products = self.products_of(company, &revaluation)?;
        Ok(revaluation.live_lines(&products)?)
    }

    /// Live sum while in draft, frozen total afterwards.
    pub fn total_value_change(&self, company: CompanyId, id: RevaluationId) -> ServiceResult<Decimal> {
        let revaluation = self.get(company, id)?;
        let products = self.products_of(company, &revaluation)?;
        Ok(revaluation.total_value_change(&products)?)
    }

    /// Freeze, post the balancing entry, then move the products to their new cost.
    pub fn confirm(&self, company: CompanyId, id: RevaluationId) -> ServiceResult<EntryRef> {
        let revaluation = self.get(company, id)?;
        let products = self.products_of(company, &revaluation)?;
        let journal = resolve_valuation_journal(self.ports.config.as_ref(), company);

        let plan = revaluation.plan_confirmation(journal.as_ref(), &products, &self.currency)?;
        let entry = self.ports.poster.post(plan.entry)?;

        let command = RevaluationCommand::Confirm(ConfirmRevaluation {
            company_id: company,
            revaluation_id: id,
            journal_id: plan.journal_id,
            snapshot: plan.snapshot.clone(),
            entry: entry.clone(),
            occurred_at: Utc::now(),
        });
        self.dispatch(company, id, command, ExpectedVersion::Exact(revaluation.version()))
            .inspect_err(|err| warn_if_orphaned(err, company, &entry))?;

        for line in &plan.snapshot.lines {
            self.ports
                .catalog
                .set_standard_price(company, line.product_id, line.new_cost)?;
        }

        self.ports.audit.note(
            company,
            AuditSubject::Revaluation(id),
            format!("Revaluation posted. Journal entry: {entry}"),
        )?;
        tracing::info!(
            %company,
            revaluation = %id,
            entry = %entry,
            total = %plan.snapshot.total_value_change,
            "revaluation posted"
        );
        Ok(entry)
    }

    /// Cancel the document. A draft is frozen from live values first; a posted
    /// entry stays posted.
    pub fn cancel(&self, company: CompanyId, id: RevaluationId) -> ServiceResult<()> {
        let revaluation = self.get(company, id)?;
        let snapshot = match revaluation.state() {
            RevaluationState::Draft => {
                let products = self.products_of(company, &revaluation)?;
                Some(FrozenSnapshot::freeze(&revaluation.live_lines(&products)?))
            }
            RevaluationState::Posted | RevaluationState::Cancelled => None,
        };

        let command = RevaluationCommand::Cancel(CancelRevaluation {
            company_id: company,
            revaluation_id: id,
            snapshot,
            occurred_at: Utc::now(),
        });
        let cancelled = self.dispatch(company, id, command, ExpectedVersion::Exact(revaluation.version()))?;

        let note = match cancelled.kept_entry() {
            Some(entry) => {
                tracing::warn!(%company, revaluation = %id, entry = %entry, "cancelled revaluation keeps its posted entry");
                format!("Revaluation cancelled. Journal entry {entry} remains posted.")
            }
            None => "Revaluation cancelled.".to_string(),
        };
        self.ports.audit.note(company, AuditSubject::Revaluation(id), note)?;
        tracing::info!(%company, revaluation = %id, "revaluation cancelled");
        Ok(())
    }

    fn products_of(
        &self,
        company: CompanyId,
        revaluation: &InventoryRevaluation,
    ) -> ServiceResult<stockval_inventory::ProductSnapshots> {
        Ok(load_products(
            self.ports.catalog.as_ref(),
            company,
            revaluation.draft_lines().iter().map(|l| l.product_id),
        )?)
    }

    fn dispatch(
        &self,
        company: CompanyId,
        id: RevaluationId,
        command: RevaluationCommand,
        expected: ExpectedVersion,
    ) -> ServiceResult<InventoryRevaluation> {
        let dispatched = self.dispatcher.dispatch(
            company,
            id.0,
            REVALUATION_AGGREGATE,
            command,
            expected,
            |a| InventoryRevaluation::empty(RevaluationId::new(a)),
        )?;
        Ok(dispatched.aggregate)
    }
}
