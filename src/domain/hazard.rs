//! Vectorized hazard footprints

use super::ids::{HazardId, RegionCode};
use geo::Polygon;

/// A traced hazard footprint tagged with its intensity
///
/// Intensity is always strictly positive and never the no-data sentinel;
/// the vectorizer drops anything else before a polygon is built.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardPolygon {
    /// Footprint in geographic coordinates, holes preserved
    pub geometry: Polygon<f64>,
    /// Hazard intensity (e.g. inundation depth) shared by every traced cell
    pub intensity: f64,
    /// Region the source raster was clipped to
    pub region: RegionCode,
    /// Hazard scenario the source raster came from
    pub hazard: HazardId,
}

impl HazardPolygon {
    pub fn new(geometry: Polygon<f64>, intensity: f64, region: RegionCode, hazard: HazardId) -> Self {
        Self {
            geometry,
            intensity,
            region,
            hazard,
        }
    }
}
