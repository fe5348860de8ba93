//! Core identifier types for the controller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a persisted program.
///
/// Backed by the SQLite rowid, so it is only assigned once a program has
/// been stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramId(i64);

impl ProgramId {
    /// Create a ProgramId from a raw database id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying integer value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ProgramId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pump speed setting. Zero means off; positive values select a motor speed.
pub type Speed = u32;
