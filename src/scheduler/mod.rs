//! Scheduler core: event model, state machine, and background loop.

mod engine;
mod event;

pub use engine::{PumpStatus, Scheduler, SchedulerError, DEFAULT_TICK_INTERVAL};
pub use event::ProgramEvent;
