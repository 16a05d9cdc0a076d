//! Domain events emitted by the valuation aggregates.

pub mod event;
pub mod handler;

pub use event::Event;
pub use handler::execute;
