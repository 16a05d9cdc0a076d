use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockval_accounting::{AnalyticDistribution, EntryRef};
use stockval_core::{
    AccountId, Aggregate, AggregateId, AggregateRoot, CompanyId, DomainError, ProductId,
    StockMoveId,
};
use stockval_events::Event;

/// Picking identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickingId(pub AggregateId);

impl PickingId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PickingId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickingTypeCode {
    Incoming,
    Outgoing,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickingState {
    Draft,
    Waiting,
    Assigned,
    Done,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveState {
    Draft,
    Waiting,
    Assigned,
    Done,
    Cancelled,
}

/// Valuation direction of a picking entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Goods leave the company (deliveries).
    Out,
    /// Goods come in (receipts and returns).
    In,
}

impl Direction {
    /// The picking type this direction values.
    pub fn picking_type(self) -> PickingTypeCode {
        match self {
            Direction::Out => PickingTypeCode::Outgoing,
            Direction::In => PickingTypeCode::Incoming,
        }
    }

    pub fn for_picking_type(code: PickingTypeCode) -> Option<Self> {
        match code {
            PickingTypeCode::Outgoing => Some(Direction::Out),
            PickingTypeCode::Incoming => Some(Direction::In),
            PickingTypeCode::Internal => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Out => "Delivery",
            Direction::In => "Receipt/Return",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::Out => f.write_str("out"),
            Direction::In => f.write_str("in"),
        }
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "out" => Ok(Direction::Out),
            "in" => Ok(Direction::In),
            other => Err(DomainError::precondition(format!(
                "invalid direction '{other}'; use 'out' or 'in'"
            ))),
        }
    }
}

/// Detailed operation of a move (quantity actually handled for a picking).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLine {
    pub picking_id: PickingId,
    pub quantity: Decimal,
}

/// A stock movement with its valuation extension fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMove {
    pub id: StockMoveId,
    pub product_id: ProductId,
    pub state: MoveState,
    /// Signed valuation computed by stock accounting (negative when goods leave).
    pub value: Decimal,
    /// Counterpart account of the valuation entry.
    pub account_override: Option<AccountId>,
    #[serde(default)]
    pub analytic_distribution: AnalyticDistribution,
    pub move_lines: Vec<MoveLine>,
    /// Entry this move contributed to, written back by picking valuation.
    #[serde(default)]
    pub entry: Option<EntryRef>,
}

impl StockMove {
    /// Realized quantity of this move within `picking`.
    pub fn done_quantity(&self, picking: PickingId) -> Decimal {
        self.move_lines
            .iter()
            .filter(|ml| ml.picking_id == picking)
            .map(|ml| ml.quantity)
            .sum()
    }
}

/// Aggregate root: StockPicking (delivery or receipt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockPicking {
    id: PickingId,
    company_id: Option<CompanyId>,
    name: String,
    type_code: PickingTypeCode,
    state: PickingState,
    moves: Vec<StockMove>,
    out_entry: Option<EntryRef>,
    in_entry: Option<EntryRef>,
    version: u64,
    created: bool,
}

impl StockPicking {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: PickingId) -> Self {
        Self {
            id,
            company_id: None,
            name: String::new(),
            type_code: PickingTypeCode::Internal,
            state: PickingState::Draft,
            moves: Vec::new(),
            out_entry: None,
            in_entry: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> PickingId {
        self.id
    }

    pub fn company_id(&self) -> Option<CompanyId> {
        self.company_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_code(&self) -> PickingTypeCode {
        self.type_code
    }

    pub fn state(&self) -> PickingState {
        self.state
    }

    pub fn moves(&self) -> &[StockMove] {
        &self.moves
    }

    pub fn exists(&self) -> bool {
        self.created
    }

    /// Entry generated for `direction`, if any.
    pub fn entry_for(&self, direction: Direction) -> Option<&EntryRef> {
        match direction {
            Direction::Out => self.out_entry.as_ref(),
            Direction::In => self.in_entry.as_ref(),
        }
    }
}

impl AggregateRoot for StockPicking {
    type Id = PickingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterPicking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPicking {
    pub company_id: CompanyId,
    pub picking_id: PickingId,
    pub name: String,
    pub type_code: PickingTypeCode,
    pub moves: Vec<StockMove>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ValidatePicking (base validation: every open move becomes done).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatePicking {
    pub company_id: CompanyId,
    pub picking_id: PickingId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordValuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordValuation {
    pub company_id: CompanyId,
    pub picking_id: PickingId,
    pub direction: Direction,
    pub entry: EntryRef,
    pub moves: Vec<StockMoveId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickingCommand {
    Register(RegisterPicking),
    Validate(ValidatePicking),
    RecordValuation(RecordValuation),
}

/// Event: PickingRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingRegistered {
    pub company_id: CompanyId,
    pub picking_id: PickingId,
    pub name: String,
    pub type_code: PickingTypeCode,
    pub moves: Vec<StockMove>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PickingValidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingValidated {
    pub company_id: CompanyId,
    pub picking_id: PickingId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ValuationRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationRecorded {
    pub company_id: CompanyId,
    pub picking_id: PickingId,
    pub direction: Direction,
    pub entry: EntryRef,
    pub moves: Vec<StockMoveId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickingEvent {
    Registered(PickingRegistered),
    Validated(PickingValidated),
    ValuationRecorded(ValuationRecorded),
}

impl Event for PickingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PickingEvent::Registered(_) => "inventory.picking.registered",
            PickingEvent::Validated(_) => "inventory.picking.validated",
            PickingEvent::ValuationRecorded(_) => "inventory.picking.valuation_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PickingEvent::Registered(e) => e.occurred_at,
            PickingEvent::Validated(e) => e.occurred_at,
            PickingEvent::ValuationRecorded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for StockPicking {
    type Command = PickingCommand;
    type Event = PickingEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PickingEvent::Registered(e) => {
                self.id = e.picking_id;
                self.company_id = Some(e.company_id);
                self.name = e.name.clone();
                self.type_code = e.type_code;
                self.state = PickingState::Assigned;
                self.moves = e.moves.clone();
                self.created = true;
            }
            PickingEvent::Validated(_) => {
                self.state = PickingState::Done;
                for mv in &mut self.moves {
                    if mv.state != MoveState::Cancelled {
                        mv.state = MoveState::Done;
                    }
                }
            }
            PickingEvent::ValuationRecorded(e) => {
                match e.direction {
                    Direction::Out => self.out_entry = Some(e.entry.clone()),
                    Direction::In => self.in_entry = Some(e.entry.clone()),
                }
                for mv in &mut self.moves {
                    if e.moves.contains(&mv.id) {
                        mv.entry = Some(e.entry.clone());
                    }
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PickingCommand::Register(cmd) => self.handle_register(cmd),
            PickingCommand::Validate(cmd) => self.handle_validate(cmd),
            PickingCommand::RecordValuation(cmd) => self.handle_record(cmd),
        }
    }
}

impl StockPicking {
    fn ensure_existing(&self, company_id: CompanyId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.company_id != Some(company_id) {
            return Err(DomainError::invariant("company mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterPicking) -> Result<Vec<PickingEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("picking already exists"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        for (idx, mv) in cmd.moves.iter().enumerate() {
            if cmd.moves[..idx].iter().any(|other| other.id == mv.id) {
                return Err(DomainError::validation("duplicate stock move"));
            }
            if mv.move_lines.iter().any(|ml| ml.quantity < Decimal::ZERO) {
                return Err(DomainError::validation("move line quantity cannot be negative"));
            }
        }

        Ok(vec![PickingEvent::Registered(PickingRegistered {
            company_id: cmd.company_id,
            picking_id: cmd.picking_id,
            name: cmd.name.clone(),
            type_code: cmd.type_code,
            moves: cmd.moves.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_validate(&self, cmd: &ValidatePicking) -> Result<Vec<PickingEvent>, DomainError> {
        self.ensure_existing(cmd.company_id)?;

        match self.state {
            PickingState::Done => Ok(vec![]),
            PickingState::Cancelled => Err(DomainError::precondition(
                "a cancelled picking cannot be validated",
            )),
            _ => Ok(vec![PickingEvent::Validated(PickingValidated {
                company_id: cmd.company_id,
                picking_id: cmd.picking_id,
                occurred_at: cmd.occurred_at,
            })]),
        }
    }

    fn handle_record(&self, cmd: &RecordValuation) -> Result<Vec<PickingEvent>, DomainError> {
        self.ensure_existing(cmd.company_id)?;

        if self.state != PickingState::Done {
            return Err(DomainError::precondition("only done pickings are valued"));
        }
        if let Some(existing) = self.entry_for(cmd.direction) {
            return Err(DomainError::conflict(format!(
                "{} {} already has journal entry {}",
                cmd.direction.label(),
                self.name,
                existing
            )));
        }
        if let Some(unknown) = cmd.moves.iter().find(|id| !self.moves.iter().any(|m| m.id == **id)) {
            return Err(DomainError::invariant(format!("move {unknown} does not belong to the picking")));
        }

        Ok(vec![PickingEvent::ValuationRecorded(ValuationRecorded {
            company_id: cmd.company_id,
            picking_id: cmd.picking_id,
            direction: cmd.direction,
            entry: cmd.entry.clone(),
            moves: cmd.moves.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stockval_core::EntryId;
    use stockval_events::execute;

    fn registered(type_code: PickingTypeCode) -> (CompanyId, StockPicking) {
        let company = CompanyId::new();
        let id = PickingId::new(AggregateId::new());
        let mut picking = StockPicking::empty(id);
        execute(
            &mut picking,
            &PickingCommand::Register(RegisterPicking {
                company_id: company,
                picking_id: id,
                name: "WH/OUT/00007".to_string(),
                type_code,
                moves: vec![StockMove {
                    id: StockMoveId::new(),
                    product_id: ProductId::new(),
                    state: MoveState::Assigned,
                    value: dec!(-120),
                    account_override: Some(AccountId::new()),
                    analytic_distribution: AnalyticDistribution::new(),
                    move_lines: vec![
                        MoveLine { picking_id: id, quantity: dec!(2) },
                        MoveLine { picking_id: PickingId::new(AggregateId::new()), quantity: dec!(5) },
                    ],
                    entry: None,
                }],
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        (company, picking)
    }

    fn validate(company: CompanyId, picking: &mut StockPicking) -> Vec<PickingEvent> {
        let id = picking.id_typed();
        execute(
            picking,
            &PickingCommand::Validate(ValidatePicking {
                company_id: company,
                picking_id: id,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap()
    }

    fn record(company: CompanyId, picking: &StockPicking, direction: Direction) -> PickingCommand {
        PickingCommand::RecordValuation(RecordValuation {
            company_id: company,
            picking_id: picking.id_typed(),
            direction,
            entry: EntryRef {
                id: EntryId::new(),
                name: "STJ/2026/0003".to_string(),
            },
            moves: picking.moves().iter().map(|m| m.id).collect(),
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn direction_parses_only_out_and_in() {
        assert_eq!("out".parse::<Direction>(), Ok(Direction::Out));
        assert_eq!("in".parse::<Direction>(), Ok(Direction::In));
        assert!(matches!("both".parse::<Direction>(), Err(DomainError::Precondition(_))));
    }

    #[test]
    fn done_quantity_only_counts_lines_of_the_picking() {
        let (_, picking) = registered(PickingTypeCode::Outgoing);
        assert_eq!(picking.moves()[0].done_quantity(picking.id_typed()), dec!(2));
    }

    #[test]
    fn validating_marks_moves_done_and_is_idempotent() {
        let (company, mut picking) = registered(PickingTypeCode::Outgoing);
        assert_eq!(validate(company, &mut picking).len(), 1);
        assert_eq!(picking.state(), PickingState::Done);
        assert_eq!(picking.moves()[0].state, MoveState::Done);

        assert!(validate(company, &mut picking).is_empty());
    }

    #[test]
    fn recorded_valuation_links_picking_and_moves_once() {
        let (company, mut picking) = registered(PickingTypeCode::Outgoing);
        validate(company, &mut picking);

        let command = record(company, &picking, Direction::Out);
        execute(&mut picking, &command).unwrap();
        let entry = picking.entry_for(Direction::Out).cloned().unwrap();
        assert_eq!(picking.moves()[0].entry.as_ref(), Some(&entry));
        assert!(picking.entry_for(Direction::In).is_none());

        let err = picking.handle(&record(company, &picking, Direction::Out)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(picking.entry_for(Direction::Out), Some(&entry));
    }

    #[test]
    fn valuation_requires_a_done_picking() {
        let (company, picking) = registered(PickingTypeCode::Incoming);
        let err = picking.handle(&record(company, &picking, Direction::In)).unwrap_err();
        assert!(matches!(err, DomainError::Precondition(_)));
    }
}
