//! Inventory valuation domain module (event-sourced).
//!
//! Business rules for manual revaluations and for the valuation entries of
//! deliveries/receipts, implemented as deterministic domain logic (no IO).

pub mod picking;
pub mod picking_valuation;
pub mod ports;
pub mod product;
pub mod revaluation;

pub use picking::{
    Direction, MoveLine, MoveState, PickingCommand, PickingEvent, PickingId, PickingRegistered,
    PickingState, PickingTypeCode, PickingValidated, RecordValuation, RegisterPicking,
    StockMove, StockPicking, ValidatePicking, ValuationRecorded,
};
pub use picking_valuation::{PickingValuationPlan, plan_picking_valuation};
pub use ports::{
    AuditLog, AuditSubject, ProductCatalog, ProductSnapshots, REVALUATION_SEQUENCE,
    SequenceGenerator, load_products,
};
pub use product::{Product, ProductCategory, valuation_account};
pub use revaluation::{
    AddLine, CancelRevaluation, ConfirmRevaluation, ConfirmationPlan, CreateRevaluation,
    FrozenLine, FrozenSnapshot, InventoryRevaluation, LineAdded, LineRemoved, LineUpdated,
    LiveLine, RemoveLine, RevaluationCancelled, RevaluationCommand, RevaluationCreated,
    RevaluationEvent, RevaluationId, RevaluationLine, RevaluationPosted, RevaluationState,
    UpdateLine, value_change,
};
