mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{Store, World};
use stockval_accounting::{AnalyticDistribution, EntryRef, JournalEntryDraft, JournalEntryPoster};
use stockval_core::{
    AccountId, AggregateId, CompanyId, Currency, DomainError, DomainResult, ProductId, StockMoveId,
};
use stockval_infra::{NewPicking, PickingValuationService, ValuationPorts};
use stockval_inventory::{
    AuditSubject, Direction, MoveLine, MoveState, PickingId, PickingState, PickingTypeCode,
    StockMove,
};

fn june_30() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2026, 6, 30)
}

fn stock_move(picking: PickingId, product: ProductId, qty: Decimal, value: Decimal, account: Option<AccountId>) -> StockMove {
    StockMove {
        id: StockMoveId::new(),
        product_id: product,
        state: MoveState::Assigned,
        value,
        account_override: account,
        analytic_distribution: AnalyticDistribution::new(),
        move_lines: vec![MoveLine {
            picking_id: picking,
            quantity: qty,
        }],
        entry: None,
    }
}

fn register(
    world: &World,
    name: &str,
    type_code: PickingTypeCode,
    moves: impl FnOnce(PickingId) -> Vec<StockMove>,
) -> Result<PickingId> {
    let id = PickingId::new(AggregateId::new());
    world.pickings.register(
        world.company,
        id,
        NewPicking {
            name: name.to_string(),
            type_code,
            moves: moves(id),
        },
    )?;
    Ok(id)
}

#[test]
fn delivery_credits_stock_valuation() -> Result<()> {
    let world = World::new();
    let desk = world.product("Desk", dec!(10), dec!(40));
    let cogs = AccountId::new();
    let id = register(&world, "WH/OUT/00001", PickingTypeCode::Outgoing, |p| {
        vec![stock_move(p, desk, dec!(3), dec!(-120), Some(cogs))]
    })?;

    let entry = world.pickings.validate(world.company, id, june_30())?.unwrap();

    let posted = world.posted_entries();
    assert_eq!(posted.len(), 1);
    let draft = &posted[0].entry;
    assert_eq!(draft.reference, "Delivery Journal Entry - WH/OUT/00001");
    assert_eq!(draft.date, june_30().unwrap());
    assert_eq!(draft.lines[0].label, "WH/OUT/00001 - Desk");
    assert_eq!((draft.lines[0].account, draft.lines[0].credit), (world.valuation_account, dec!(120)));
    assert_eq!((draft.lines[1].account, draft.lines[1].debit), (cogs, dec!(120)));

    let picking = world.pickings.get(world.company, id)?;
    assert_eq!(picking.state(), PickingState::Done);
    assert_eq!(picking.entry_for(Direction::Out), Some(&entry));
    assert_eq!(picking.moves()[0].entry.as_ref(), Some(&entry));

    let notes = world.audit.notes_for(AuditSubject::Picking(id));
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains(&entry.name));
    Ok(())
}

#[test]
fn receipt_debits_stock_valuation() -> Result<()> {
    let world = World::new();
    let desk = world.product("Desk", dec!(0), dec!(40));
    let interim = AccountId::new();
    let id = register(&world, "WH/IN/00004", PickingTypeCode::Incoming, |p| {
        vec![stock_move(p, desk, dec!(2), dec!(80), Some(interim))]
    })?;

    world.pickings.validate(world.company, id, june_30())?;

    let draft = &world.posted_entries()[0].entry;
    assert_eq!(draft.reference, "Receipt/Return Journal Entry - WH/IN/00004");
    assert_eq!((draft.lines[0].account, draft.lines[0].debit), (world.valuation_account, dec!(80)));
    assert_eq!((draft.lines[1].account, draft.lines[1].credit), (interim, dec!(80)));
    Ok(())
}

#[test]
fn validating_twice_creates_a_single_entry() -> Result<()> {
    let world = World::new();
    let desk = world.product("Desk", dec!(10), dec!(40));
    let id = register(&world, "WH/OUT/00002", PickingTypeCode::Outgoing, |p| {
        vec![stock_move(p, desk, dec!(1), dec!(-40), Some(AccountId::new()))]
    })?;

    assert!(world.pickings.validate(world.company, id, june_30())?.is_some());
    assert!(world.pickings.validate(world.company, id, june_30())?.is_none());
    assert_eq!(world.posted_entries().len(), 1);
    Ok(())
}

#[test]
fn a_zero_valued_move_rejects_the_whole_picking() -> Result<()> {
    let world = World::new();
    let desk = world.product("Desk", dec!(10), dec!(40));
    let sample = world.product("Free Sample", dec!(10), dec!(0));
    let account = Some(AccountId::new());
    let id = register(&world, "WH/OUT/00003", PickingTypeCode::Outgoing, |p| {
        vec![
            stock_move(p, desk, dec!(1), dec!(-40), account),
            stock_move(p, sample, dec!(1), dec!(0), account),
        ]
    })?;

    let err = world.pickings.validate(world.company, id, june_30()).unwrap_err();
    match err.as_domain() {
        Some(DomainError::ZeroValue { products }) => assert_eq!(products, &vec!["Free Sample".to_string()]),
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(world.posted_entries().is_empty());
    let picking = world.pickings.get(world.company, id)?;
    assert_eq!(picking.state(), PickingState::Assigned);
    assert!(picking.entry_for(Direction::Out).is_none());
    Ok(())
}

#[test]
fn a_missing_override_account_names_the_product() -> Result<()> {
    let world = World::new();
    let desk = world.product("Desk", dec!(10), dec!(40));
    let id = register(&world, "WH/OUT/00005", PickingTypeCode::Outgoing, |p| {
        vec![stock_move(p, desk, dec!(1), dec!(-40), None)]
    })?;

    let err = world.pickings.validate(world.company, id, june_30()).unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::Precondition(msg)) if msg.contains("Desk")), "{err}");
    assert!(world.posted_entries().is_empty());
    Ok(())
}

#[test]
fn a_missing_valuation_account_is_a_configuration_error() -> Result<()> {
    let world = World::new();
    let desk = world.product_with("Desk", dec!(10), dec!(40), true, None);
    let id = register(&world, "WH/OUT/00006", PickingTypeCode::Outgoing, |p| {
        vec![stock_move(p, desk, dec!(1), dec!(-40), Some(AccountId::new()))]
    })?;

    let err = world.pickings.validate(world.company, id, june_30()).unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::MissingConfiguration(_))), "{err}");
    Ok(())
}

#[test]
fn consumables_and_internal_transfers_are_not_valued() -> Result<()> {
    let world = World::new();
    let soap = world.product_with("Soap", dec!(10), dec!(2), false, None);
    let desk = world.product("Desk", dec!(10), dec!(40));

    let delivery = register(&world, "WH/OUT/00007", PickingTypeCode::Outgoing, |p| {
        vec![stock_move(p, soap, dec!(1), dec!(-2), Some(AccountId::new()))]
    })?;
    let transfer = register(&world, "WH/INT/00001", PickingTypeCode::Internal, |p| {
        vec![stock_move(p, desk, dec!(1), dec!(0), None)]
    })?;

    assert_eq!(world.pickings.validate(world.company, delivery, june_30())?, None);
    assert_eq!(world.pickings.validate(world.company, transfer, june_30())?, None);
    assert!(world.posted_entries().is_empty());
    assert_eq!(world.pickings.get(world.company, transfer)?.state(), PickingState::Done);
    Ok(())
}

#[test]
fn the_analytic_distribution_follows_the_override_line() -> Result<()> {
    let world = World::new();
    let desk = world.product("Desk", dec!(10), dec!(40));
    let distribution = AnalyticDistribution::new()
        .with("project-alpha", dec!(60))
        .with("project-beta", dec!(40));
    let id = register(&world, "WH/OUT/00008", PickingTypeCode::Outgoing, |p| {
        let mut mv = stock_move(p, desk, dec!(1), dec!(-40), Some(AccountId::new()));
        mv.analytic_distribution = distribution.clone();
        vec![mv]
    })?;

    world.pickings.validate(world.company, id, june_30())?;

    let lines = &world.posted_entries()[0].entry.lines;
    assert_eq!(lines[0].analytic_distribution, None);
    assert_eq!(lines[1].analytic_distribution.as_ref(), Some(&distribution));
    Ok(())
}

#[test]
fn direct_creation_refuses_an_already_valued_direction() -> Result<()> {
    let world = World::new();
    let desk = world.product("Desk", dec!(10), dec!(40));
    let id = register(&world, "WH/OUT/00009", PickingTypeCode::Outgoing, |p| {
        vec![stock_move(p, desk, dec!(1), dec!(-40), Some(AccountId::new()))]
    })?;
    let entry = world.pickings.validate(world.company, id, june_30())?.unwrap();

    let err = world
        .pickings
        .create_picking_entry(world.company, id, "out".parse()?, june_30())
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::Precondition(msg)) if msg.contains(&entry.name)), "{err}");

    let other_way = world
        .pickings
        .create_picking_entry(world.company, id, Direction::In, june_30())?;
    assert_eq!(other_way, None);

    assert!(matches!("sideways".parse::<Direction>(), Err(DomainError::Precondition(_))));
    Ok(())
}

#[test]
fn only_moves_with_rows_get_the_entry_written_back() -> Result<()> {
    let world = World::new();
    let desk = world.product("Desk", dec!(10), dec!(40));
    let chair = world.product("Chair", dec!(10), dec!(15));
    let id = register(&world, "WH/OUT/00010", PickingTypeCode::Outgoing, |p| {
        vec![
            stock_move(p, desk, dec!(2), dec!(-80), Some(AccountId::new())),
            stock_move(p, chair, dec!(0), dec!(0), Some(AccountId::new())),
        ]
    })?;

    let entry = world.pickings.validate(world.company, id, june_30())?.unwrap();

    let picking = world.pickings.get(world.company, id)?;
    assert_eq!(picking.moves()[0].entry.as_ref(), Some(&entry));
    assert_eq!(picking.moves()[1].entry, None);
    assert_eq!(world.posted_entries()[0].entry.lines.len(), 2);
    Ok(())
}

/// Posts through the ledger, then lets a second operator validate the same
/// picking before the first one stores it.
struct InterleavedPoster {
    ledger: Arc<dyn JournalEntryPoster>,
    rival: PickingValuationService<Store>,
    company: CompanyId,
    picking: PickingId,
    interleaved: AtomicBool,
}

impl JournalEntryPoster for InterleavedPoster {
    fn post(&self, draft: JournalEntryDraft) -> DomainResult<EntryRef> {
        let entry = self.ledger.post(draft)?;
        if !self.interleaved.swap(true, Ordering::SeqCst) {
            self.rival
                .validate(self.company, self.picking, june_30())
                .map_err(|err| DomainError::conflict(err.to_string()))?;
        }
        Ok(entry)
    }
}

#[test]
fn concurrent_validation_loses_the_race_and_leaves_its_entry_unlinked() -> Result<()> {
    let world = World::new();
    let desk = world.product("Desk", dec!(10), dec!(40));
    let id = register(&world, "WH/OUT/00011", PickingTypeCode::Outgoing, |p| {
        vec![stock_move(p, desk, dec!(3), dec!(-120), Some(AccountId::new()))]
    })?;

    let currency = Currency::new("USD", 2);
    let racing = PickingValuationService::new(
        world.store.clone(),
        ValuationPorts {
            poster: Arc::new(InterleavedPoster {
                ledger: world.ports.poster.clone(),
                rival: PickingValuationService::new(world.store.clone(), world.ports.clone(), currency.clone()),
                company: world.company,
                picking: id,
                interleaved: AtomicBool::new(false),
            }),
            ..world.ports.clone()
        },
        currency,
    );

    let err = racing.validate(world.company, id, june_30()).unwrap_err();
    assert!(err.is_conflict(), "{err}");

    let posted = world.posted_entries();
    assert_eq!(posted.len(), 2);
    let picking = world.pickings.get(world.company, id)?;
    let linked = picking.entry_for(Direction::Out).unwrap();
    assert_eq!(picking.moves()[0].entry.as_ref(), Some(linked));
    let notes = world.audit.notes_for(AuditSubject::Picking(id));
    assert_eq!(notes.len(), 1, "{notes:?}");
    Ok(())
}
