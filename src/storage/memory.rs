//! In-memory program store.
//!
//! Thread-safe backend for tests and development. Data is not persisted.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use super::{NewProgram, ProgramStore, StoreError};
use crate::core::program::Program;
use crate::core::season::SeasonTable;
use crate::core::types::ProgramId;

/// In-memory store backend.
pub struct InMemoryStore {
    programs: RwLock<HashMap<ProgramId, Program>>,
    seasons: RwLock<SeasonTable>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    /// Create an empty store with the given season table.
    pub fn new(seasons: SeasonTable) -> Self {
        Self {
            programs: RwLock::new(HashMap::new()),
            seasons: RwLock::new(seasons),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(SeasonTable::default())
    }
}

#[async_trait]
impl ProgramStore for InMemoryStore {
    async fn add_program(&self, new: NewProgram) -> Result<Program, StoreError> {
        let mut programs = self.programs.write().map_err(|_| StoreError::LockPoisoned)?;
        if programs.values().any(|p| p.start == new.start) {
            return Err(StoreError::DuplicateStart(new.start.to_string()));
        }

        let id = ProgramId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let program = Program {
            id,
            speed: new.speed,
            start: new.start,
            summer_duration: new.summer_duration,
            winter_duration: new.winter_duration,
        };
        programs.insert(id, program.clone());
        Ok(program)
    }

    async fn get_program(&self, id: ProgramId) -> Result<Program, StoreError> {
        let programs = self.programs.read().map_err(|_| StoreError::LockPoisoned)?;
        programs
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("program: {id}")))
    }

    async fn list_programs(&self) -> Result<Vec<Program>, StoreError> {
        let programs = self.programs.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut result: Vec<_> = programs.values().cloned().collect();
        result.sort_by_key(|p| p.start);
        Ok(result)
    }

    async fn update_program(&self, program: Program) -> Result<(), StoreError> {
        let mut programs = self.programs.write().map_err(|_| StoreError::LockPoisoned)?;
        if !programs.contains_key(&program.id) {
            return Err(StoreError::NotFound(format!("program: {}", program.id)));
        }
        if programs
            .values()
            .any(|p| p.id != program.id && p.start == program.start)
        {
            return Err(StoreError::DuplicateStart(program.start.to_string()));
        }
        programs.insert(program.id, program);
        Ok(())
    }

    async fn delete_program(&self, id: ProgramId) -> Result<(), StoreError> {
        let mut programs = self.programs.write().map_err(|_| StoreError::LockPoisoned)?;
        programs
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("program: {id}")))?;
        Ok(())
    }

    async fn season_table(&self) -> Result<SeasonTable, StoreError> {
        let seasons = self.seasons.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(*seasons)
    }
}
