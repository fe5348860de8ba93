//! Core domain types: programs, seasons, and identifiers.

pub mod program;
pub mod season;
pub mod types;
