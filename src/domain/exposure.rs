//! Auxiliary layers and overlay results

use super::ids::{HazardId, RegionCode};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// Population total for one region, as read from the population table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub region: RegionCode,
    pub population: f64,
}

/// A telecom coverage footprint
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRecord {
    /// Radio technology the footprint belongs to (e.g. `GSM`)
    pub technology: String,
    pub geometry: MultiPolygon<f64>,
}

/// Attribute carried by an exposure result, depending on the auxiliary layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "lowercase")]
pub enum ExposureAttribute {
    /// Population overlay
    Population {
        /// Region total, copied unchanged from the population table
        count: f64,
        /// `count` scaled by the share of the region area under this footprint
        exposed: f64,
    },
    /// Coverage overlay
    Coverage { technology: String },
}

/// One intersected geometry with the attributes of both inputs
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureResult {
    pub region: RegionCode,
    pub hazard: HazardId,
    pub intensity: f64,
    pub geometry: MultiPolygon<f64>,
    pub attribute: ExposureAttribute,
}

impl ExposureResult {
    /// Population count attached to the result, if any
    pub fn population(&self) -> Option<f64> {
        match &self.attribute {
            ExposureAttribute::Population { count, .. } => Some(*count),
            ExposureAttribute::Coverage { .. } => None,
        }
    }
}
