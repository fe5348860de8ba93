//! Program store abstraction.
//!
//! The scheduler only sees the store through the [`ProgramStore`] trait:
//! CRUD over programs plus the `next_start_event` contract that answers
//! "what is the next event after time T". Backends are pluggable
//! (in-memory for tests, SQLite for the real controller).

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use thiserror::Error;

use crate::core::program::Program;
use crate::core::season::{duration_for, SeasonTable};
use crate::core::types::{ProgramId, Speed};
use crate::scheduler::ProgramEvent;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested program was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A program with the same start time already exists.
    #[error("start times must be unique: {0}")]
    DuplicateStart(String),

    /// Store lock was poisoned.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// Generic backend error.
    #[error("store error: {0}")]
    Other(String),
}

/// Fields for a program that has not been assigned an id yet.
#[derive(Debug, Clone)]
pub struct NewProgram {
    pub speed: Speed,
    pub start: NaiveTime,
    pub summer_duration: Duration,
    pub winter_duration: Duration,
}

/// Persisted set of programs and season boundary dates.
#[async_trait]
pub trait ProgramStore: Send + Sync {
    /// Insert a program and return it with its assigned id.
    async fn add_program(&self, new: NewProgram) -> Result<Program, StoreError>;

    /// Fetch a single program by id.
    async fn get_program(&self, id: ProgramId) -> Result<Program, StoreError>;

    /// All programs, ordered by start time.
    async fn list_programs(&self) -> Result<Vec<Program>, StoreError>;

    /// Replace the stored fields of an existing program.
    async fn update_program(&self, program: Program) -> Result<(), StoreError>;

    /// Remove a program by id.
    async fn delete_program(&self, id: ProgramId) -> Result<(), StoreError>;

    /// Season boundary dates used by the duration interpolator.
    async fn season_table(&self) -> Result<SeasonTable, StoreError>;

    /// The next program start strictly after `after`, as a ready-to-arm
    /// start event.
    ///
    /// The event's duration is interpolated between the program's seasonal
    /// extremes for the calendar date it will fire on. Returns `None` when
    /// no programs exist.
    async fn next_start_event(
        &self,
        after: DateTime<Utc>,
    ) -> Result<Option<ProgramEvent>, StoreError> {
        let programs = self.list_programs().await?;
        let Some((program, event_time)) = programs
            .into_iter()
            .map(|p| {
                let occurrence = p.next_occurrence(after);
                (p, occurrence)
            })
            .min_by_key(|(_, occurrence)| *occurrence)
        else {
            return Ok(None);
        };

        let seasons = self.season_table().await?;
        let duration = duration_for(
            event_time.date_naive(),
            program.summer_duration,
            program.winter_duration,
            &seasons,
        );

        Ok(Some(ProgramEvent::Start {
            event_time,
            duration,
            speed: program.speed,
        }))
    }
}
