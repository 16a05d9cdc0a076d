use chrono::{NaiveDate, Utc};

use stockval_accounting::{EntryRef, resolve_valuation_journal};
use stockval_core::{AggregateRoot, CompanyId, Currency, DomainError, ExpectedVersion};
use stockval_inventory::{
    AuditSubject, Direction, PickingCommand, PickingId, PickingTypeCode, PickingValuationPlan,
    RecordValuation, RegisterPicking, StockMove, StockPicking, ValidatePicking, load_products,
    plan_picking_valuation,
};
use stockval_events::execute;

use super::{ValuationPorts, today, warn_if_orphaned};
use crate::command_dispatcher::CommandDispatcher;
use crate::error::ServiceResult;
use crate::event_store::EventStore;

pub const PICKING_AGGREGATE: &str = "inventory.picking";

/// A delivery, receipt or internal transfer handed over by stock operations.
#[derive(Debug, Clone)]
pub struct NewPicking {
    pub name: String,
    pub type_code: PickingTypeCode,
    pub moves: Vec<StockMove>,
}

/// Picking validation with its valuation entries.
pub struct PickingValuationService<S> {
    dispatcher: CommandDispatcher<S>,
    ports: ValuationPorts,
    currency: Currency,
}

impl<S: EventStore> PickingValuationService<S> {
    pub fn new(store: S, ports: ValuationPorts, currency: Currency) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(store),
            ports,
            currency,
        }
    }

    /// Register a picking under an id chosen by the caller, so move lines can
    /// reference it.
    pub fn register(&self, company: CompanyId, id: PickingId, picking: NewPicking) -> ServiceResult<StockPicking> {
        let command = PickingCommand::Register(RegisterPicking {
            company_id: company,
            picking_id: id,
            name: picking.name,
            type_code: picking.type_code,
            moves: picking.moves,
            occurred_at: Utc::now(),
        });
        self.dispatch(company, id, command, ExpectedVersion::Exact(0))
    }

    pub fn get(&self, company: CompanyId, id: PickingId) -> ServiceResult<StockPicking> {
        let picking = self
            .dispatcher
            .load(company, id.0, |a| StockPicking::empty(PickingId::new(a)))?;
        if !picking.exists() {
            return Err(DomainError::not_found().into());
        }
        Ok(picking)
    }

    /// Validate the picking and value it once it is done.
    ///
    /// The entry is planned against the validated state before anything is
    /// stored, so a valuation error leaves the picking as it was. Returns the
    /// entry created by this call; `None` when there was nothing to value or
    /// the picking already has its entry.
    ///
    /// The entry is posted before the picking is stored as done. If another
    /// writer updated the picking in between, this returns a conflict and the
    /// posted entry is left unlinked (logged at `warn`).
    pub fn validate(
        &self,
        company: CompanyId,
        id: PickingId,
        valuation_date: Option<NaiveDate>,
    ) -> ServiceResult<Option<EntryRef>> {
        let picking = self.get(company, id)?;
        let command = PickingCommand::Validate(ValidatePicking {
            company_id: company,
            picking_id: id,
            occurred_at: Utc::now(),
        });
        let mut validated = picking.clone();
        execute(&mut validated, &command)?;

        let plan = match Direction::for_picking_type(validated.type_code()) {
            None => None,
            Some(direction) => match validated.entry_for(direction) {
                Some(existing) => {
                    tracing::debug!(%company, picking = validated.name(), entry = %existing, "picking already valued");
                    None
                }
                None => self.plan(&validated, direction, valuation_date)?,
            },
        };

        let entry = plan
            .as_ref()
            .map(|plan| self.ports.poster.post(plan.entry.clone()))
            .transpose()?;
        let validated = self
            .dispatch(company, id, command, ExpectedVersion::Exact(picking.version()))
            .inspect_err(|err| {
                if let Some(entry) = &entry {
                    warn_if_orphaned(err, company, entry);
                }
            })?;

        match (plan, entry) {
            (Some(plan), Some(entry)) => {
                self.record(&validated, plan, entry.clone())?;
                Ok(Some(entry))
            }
            _ => Ok(None),
        }
    }

    /// Create the entry of `direction` for an already done picking.
    ///
    /// Fails if that direction already has an entry.
    pub fn create_picking_entry(
        &self,
        company: CompanyId,
        id: PickingId,
        direction: Direction,
        valuation_date: Option<NaiveDate>,
    ) -> ServiceResult<Option<EntryRef>> {
        let picking = self.get(company, id)?;
        let Some(plan) = self.plan(&picking, direction, valuation_date)? else {
            return Ok(None);
        };
        let entry = self.ports.poster.post(plan.entry.clone())?;
        self.record(&picking, plan, entry.clone())?;
        Ok(Some(entry))
    }

    fn plan(
        &self,
        picking: &StockPicking,
        direction: Direction,
        valuation_date: Option<NaiveDate>,
    ) -> ServiceResult<Option<PickingValuationPlan>> {
        let company = picking.company_id().ok_or_else(DomainError::not_found)?;
        let products = load_products(
            self.ports.catalog.as_ref(),
            company,
            picking.moves().iter().map(|m| m.product_id),
        )?;
        let journal = resolve_valuation_journal(self.ports.config.as_ref(), company);

        Ok(plan_picking_valuation(
            picking,
            direction,
            journal.as_ref(),
            &products,
            &self.currency,
            valuation_date.unwrap_or_else(today),
        )?)
    }

    /// Link the posted entry to the picking and its contributing moves.
    fn record(&self, picking: &StockPicking, plan: PickingValuationPlan, entry: EntryRef) -> ServiceResult<()> {
        let company = picking.company_id().ok_or_else(DomainError::not_found)?;
        let id = picking.id_typed();
        let direction = plan.direction;

        for line in &plan.entry.lines {
            if let Some(distribution) = &line.analytic_distribution {
                tracing::debug!(
                    picking = picking.name(),
                    account = %line.account,
                    analytic = ?distribution.display_weights(),
                    "analytic distribution carried"
                );
            }
        }

        let command = PickingCommand::RecordValuation(RecordValuation {
            company_id: company,
            picking_id: id,
            direction,
            entry: entry.clone(),
            moves: plan.moves,
            occurred_at: Utc::now(),
        });
        self.dispatch(company, id, command, ExpectedVersion::Exact(picking.version()))
            .inspect_err(|err| warn_if_orphaned(err, company, &entry))?;

        self.ports.audit.note(
            company,
            AuditSubject::Picking(id),
            format!("{} journal entry {entry} created for {}.", direction.label(), plan.total),
        )?;
        tracing::info!(
            %company,
            picking = picking.name(),
            %direction,
            entry = %entry,
            total = %plan.total,
            "picking valued"
        );
        Ok(())
    }

    fn dispatch(
        &self,
        company: CompanyId,
        id: PickingId,
        command: PickingCommand,
        expected: ExpectedVersion,
    ) -> ServiceResult<StockPicking> {
        let dispatched = self.dispatcher.dispatch(
            company,
            id.0,
            PICKING_AGGREGATE,
            command,
            expected,
            |a| StockPicking::empty(PickingId::new(a)),
        )?;
        Ok(dispatched.aggregate)
    }
}
