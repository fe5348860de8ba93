//! poolfilter - a pool filter pump controller.
//!
//! Runs recurring pump programs on a timed schedule with seasonal duration
//! interpolation, and exposes an HTTP API for managing programs and manual
//! overrides. The scheduler core holds exactly one pending event behind a
//! single lock; a background loop fires it at the right wall-clock time.

pub mod api;
pub mod config;
pub mod core;
pub mod hardware;
pub mod scheduler;
pub mod storage;

pub use config::AppConfig;
pub use hardware::{PumpDriver, RecordingDriver, TracingDriver};
pub use scheduler::{ProgramEvent, PumpStatus, Scheduler, SchedulerError};
pub use storage::{InMemoryStore, NewProgram, ProgramStore, SqliteStore, StoreError};
