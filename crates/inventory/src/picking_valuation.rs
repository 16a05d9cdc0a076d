//! Valuation entries of deliveries and receipts.
//!
//! Every done, storable move of the picking contributes a valuation row and an
//! override-account row for its absolute value. Outgoing pickings credit the
//! valuation account, incoming ones debit it.
//!
//! Zero-valued moves are collected over the whole picking and reported in one
//! error, so all offending products can be fixed before resubmitting.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use stockval_accounting::{Journal, JournalEntryDraft, JournalEntryLine, require_valuation_journal};
use stockval_core::{Currency, DomainError, DomainResult, StockMoveId};

use crate::picking::{Direction, MoveState, StockPicking};
use crate::ports::ProductSnapshots;
use crate::product::valuation_account;

/// Entry to post for one direction of a picking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickingValuationPlan {
    pub direction: Direction,
    pub entry: JournalEntryDraft,
    /// Moves that produced rows; they get the entry written back.
    pub moves: Vec<StockMoveId>,
    pub total: Decimal,
}

/// Build the valuation entry of `picking` for `direction`.
///
/// Returns `Ok(None)` when there is nothing to value: the picking type does
/// not match the direction, or no done move is stock-tracked.
pub fn plan_picking_valuation(
    picking: &StockPicking,
    direction: Direction,
    journal: Option<&Journal>,
    products: &ProductSnapshots,
    currency: &Currency,
    date: NaiveDate,
) -> DomainResult<Option<PickingValuationPlan>> {
    if let Some(existing) = picking.entry_for(direction) {
        return Err(DomainError::precondition(format!(
            "{} {} already has journal entry {}",
            direction.label(),
            picking.name(),
            existing
        )));
    }

    if picking.type_code() != direction.picking_type() {
        return Ok(None);
    }

    let journal = require_valuation_journal(journal)?;
    let company = picking.company_id().ok_or_else(DomainError::not_found)?;

    let moves: Vec<_> = picking
        .moves()
        .iter()
        .filter(|mv| mv.state == MoveState::Done)
        .filter_map(|mv| {
            products
                .get(&mv.product_id)
                .filter(|p| p.storable)
                .map(|p| (mv, p))
        })
        .collect();
    if moves.is_empty() {
        return Ok(None);
    }

    let mut lines = Vec::with_capacity(moves.len() * 2);
    let mut contributing = Vec::with_capacity(moves.len());
    let mut total = Decimal::ZERO;
    let mut zero_value_products = Vec::new();

    for (mv, product) in moves {
        if mv.done_quantity(picking.id_typed()).is_zero() {
            continue;
        }

        if currency.is_zero(mv.value) {
            zero_value_products.push(product.display_name.clone());
            continue;
        }
        let amount = currency.round(mv.value.abs());

        let override_account = mv.account_override.ok_or_else(|| {
            DomainError::precondition(format!(
                "missing account on the line of product '{}'; assign it before validating",
                product.display_name
            ))
        })?;
        let valuation = valuation_account(product)?;

        let label = format!("{} - {}", picking.name(), product.display_name);
        let (valuation_line, override_line) = match direction {
            Direction::Out => (
                JournalEntryLine::credit(label.clone(), valuation, amount),
                JournalEntryLine::debit(label, override_account, amount),
            ),
            Direction::In => (
                JournalEntryLine::debit(label.clone(), valuation, amount),
                JournalEntryLine::credit(label, override_account, amount),
            ),
        };
        lines.push(valuation_line.for_product(product.id));
        lines.push(
            override_line
                .for_product(product.id)
                .with_analytic_distribution(&mv.analytic_distribution),
        );

        contributing.push(mv.id);
        total += amount;
    }

    if !zero_value_products.is_empty() {
        return Err(DomainError::zero_value(zero_value_products));
    }
    if lines.is_empty() || total <= Decimal::ZERO {
        return Err(DomainError::no_effect("no valuation lines were produced"));
    }

    Ok(Some(PickingValuationPlan {
        direction,
        entry: JournalEntryDraft {
            journal: journal.clone(),
            company,
            date,
            reference: format!("{} Journal Entry - {}", direction.label(), picking.name()),
            lines,
        },
        moves: contributing,
        total,
    }))
}
