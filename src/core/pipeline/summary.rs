//! Per-item outcomes and run summary
//!
//! Every unit of work the pipeline attempts ends in an [`ItemReport`]. Items
//! never abort their siblings: a failure is recorded as a skip with a reason
//! and the run moves on.

use crate::domain::{FloodlineError, ItemKey};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Processing stages of an item, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Loaded,
    Clipped,
    Vectorized,
    Overlaid,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loaded => "loaded",
            Stage::Clipped => "clipped",
            Stage::Vectorized => "vectorized",
            Stage::Overlaid => "overlaid",
            Stage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

/// Why an item was skipped
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The clip or overlay produced no geometry
    EmptyGeometry,
    /// An input file is missing
    DataNotFound(String),
    /// A raster could not be decoded
    MalformedRaster(String),
    /// Overlay inputs were degenerate
    Overlay(String),
    /// Any other error
    Failed(String),
}

impl SkipReason {
    /// Short label used for grouping and logs
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::EmptyGeometry => "empty_geometry",
            SkipReason::DataNotFound(_) => "data_not_found",
            SkipReason::MalformedRaster(_) => "malformed_raster",
            SkipReason::Overlay(_) => "overlay",
            SkipReason::Failed(_) => "failed",
        }
    }

    /// Whether the skip indicates a problem rather than absent data
    pub fn is_failure(&self) -> bool {
        !matches!(self, SkipReason::EmptyGeometry | SkipReason::DataNotFound(_))
    }
}

impl From<&FloodlineError> for SkipReason {
    fn from(error: &FloodlineError) -> Self {
        match error {
            FloodlineError::DataNotFound(m) => SkipReason::DataNotFound(m.clone()),
            FloodlineError::MalformedRaster(m) => SkipReason::MalformedRaster(m.clone()),
            FloodlineError::Overlay(m) => SkipReason::Overlay(m.clone()),
            other => SkipReason::Failed(other.to_string()),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyGeometry => f.write_str("empty geometry"),
            SkipReason::DataNotFound(m)
            | SkipReason::MalformedRaster(m)
            | SkipReason::Overlay(m)
            | SkipReason::Failed(m) => write!(f, "{}: {}", self.label(), m),
        }
    }
}

/// Final state of one item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    Skipped(SkipReason),
}

/// Result of processing one item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub key: ItemKey,
    /// Last stage reached when completed; the stage that stopped it when skipped
    pub stage: Stage,
    pub outcome: Outcome,
}

impl ItemReport {
    pub fn completed(key: ItemKey, stage: Stage) -> Self {
        Self {
            key,
            stage,
            outcome: Outcome::Completed,
        }
    }

    /// Records a skip and logs it
    pub fn skipped(key: ItemKey, stage: Stage, reason: SkipReason) -> Self {
        if reason.is_failure() {
            tracing::warn!(item = %key, stage = %stage, reason = %reason, "Item failed");
        } else {
            crate::log_item_skipped!(key, stage, reason);
        }
        Self {
            key,
            stage,
            outcome: Outcome::Skipped(reason),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == Outcome::Completed
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Countries visited
    pub countries: usize,

    /// Hazard polygons traced
    pub polygons: usize,

    /// Exposure results written
    pub exposure_results: usize,

    /// Whether outputs were suppressed
    pub dry_run: bool,

    /// Duration of the run
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,

    /// Every item attempted, in processing order
    pub items: Vec<ItemReport>,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            countries: 0,
            polygons: 0,
            exposure_results: 0,
            dry_run,
            duration: Duration::from_secs(0),
            items: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn record(&mut self, report: ItemReport) {
        self.items.push(report);
    }

    pub fn completed(&self) -> usize {
        self.items.iter().filter(|i| i.is_completed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.items.len() - self.completed()
    }

    /// Items skipped because something went wrong
    pub fn failures(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(&i.outcome, Outcome::Skipped(r) if r.is_failure()))
            .count()
    }

    /// Skip counts keyed by reason label
    pub fn skips_by_reason(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            if let Outcome::Skipped(reason) = &item.outcome {
                *counts.entry(reason.label()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// True when no item failed
    pub fn is_successful(&self) -> bool {
        self.failures() == 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            countries = self.countries,
            items = self.items.len(),
            completed = self.completed(),
            skipped = self.skipped(),
            polygons = self.polygons,
            exposure_results = self.exposure_results,
            dry_run = self.dry_run,
            duration_secs = self.duration.as_secs(),
            "Run completed"
        );

        for (reason, count) in self.skips_by_reason() {
            tracing::info!(reason, count, "Skipped items");
        }
        if !self.is_successful() {
            tracing::warn!(failures = self.failures(), "Run completed with failures");
        }
    }
}
