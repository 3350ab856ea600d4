//! Batch orchestration
//!
//! This module runs the stages end to end:
//! - Country selection from the catalogue or an explicit list
//! - Clipping, vectorization and overlay coordination
//! - Per-item reports and the run summary

pub mod coordinator;
pub mod summary;

pub use coordinator::{CountryTarget, Pipeline};
pub use summary::{ItemReport, Outcome, RunSummary, SkipReason, Stage};
