//! Integration tests for the pool filter controller.
//!
//! These tests verify end-to-end scenarios including:
//! - HTTP API endpoints over the full router
//! - Scheduler behavior against real wall-clock time

mod common;

mod integration {
    pub mod api;
    pub mod end_to_end;
}
