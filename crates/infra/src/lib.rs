//! Infrastructure layer: configuration, event store, in-memory adapters and
//! the valuation services.

pub mod adapters;
pub mod command_dispatcher;
pub mod config;
pub mod error;
pub mod event_store;
pub mod services;

pub use command_dispatcher::{CommandDispatcher, Dispatched};
pub use self::config::Settings;
pub use error::{ServiceError, ServiceResult};
pub use services::{
    NewPicking, NewRevaluation, PickingValuationService, RevaluationService, ValuationPorts,
};
