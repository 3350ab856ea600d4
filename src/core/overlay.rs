//! Spatial overlay engine
//!
//! Combines traced hazard polygons with the auxiliary layers: population per
//! administrative region and telecom coverage footprints. Intersections are
//! planar polygon clipping on EPSG:4326 coordinates, which is adequate for
//! the regional extents handled here.

use crate::adapters::vector::{read_hazard_polygons, write_exposure_results};
use crate::adapters::Layout;
use crate::domain::{
    CountryCode, CoverageRecord, ExposureAttribute, ExposureResult, FloodlineError, HazardId,
    HazardKind, HazardPolygon, PopulationRecord, Region, RegionCode, Result,
};
use geo::{Area, BooleanOps, BoundingRect, Intersects, MultiPolygon, Rect};
use std::collections::HashMap;
use std::panic;
use std::path::{Path, PathBuf};

/// Intersects hazard polygons with population and coverage layers
#[derive(Debug, Clone, Default)]
pub struct OverlayEngine;

impl OverlayEngine {
    pub fn new() -> Self {
        Self
    }

    /// Every persisted hazard polygon of a country and hazard kind
    ///
    /// Reads `{hazard}/vectors/*` for every hazard scenario under the layout's
    /// hazard root and concatenates the polygons. Nothing is deduplicated:
    /// scenarios that cover the same ground all contribute their polygons.
    /// Files that cannot be read are logged and skipped.
    pub fn pop_flood(
        &self,
        layout: &dyn Layout,
        country: &CountryCode,
        kind: HazardKind,
    ) -> Result<Vec<HazardPolygon>> {
        let root = layout.hazard_root(country, kind);
        let mut combined = Vec::new();
        let mut files = 0usize;

        for hazard_dir in sorted_entries(&root, |p| p.is_dir())? {
            let hazard = match HazardId::from_path(&hazard_dir) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(path = %hazard_dir.display(), error = %e, "Skipping hazard directory");
                    continue;
                }
            };
            let vectors = layout.vector_dir(country, kind, &hazard);
            let geojson = |p: &Path| p.extension().is_some_and(|e| e == "geojson");
            for path in sorted_entries(&vectors, geojson)? {
                let Some(region) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| RegionCode::new(s).ok())
                else {
                    continue;
                };
                match read_hazard_polygons(&path, &region, &hazard) {
                    Ok(polygons) => {
                        files += 1;
                        combined.extend(polygons);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable hazard file");
                    }
                }
            }
        }

        tracing::debug!(
            country = %country,
            kind = %kind,
            files,
            polygons = combined.len(),
            "Combined hazard polygons"
        );
        Ok(combined)
    }

    /// Intersects population-weighted regions with hazard polygons
    ///
    /// Population rows are inner-joined to `boundaries` on the region code;
    /// rows and regions without a partner are dropped. Each non-empty
    /// intersection of a joined region with a hazard polygon becomes one
    /// result carrying the hazard intensity, the region's population and the
    /// share of it living under the footprint (uniform density assumed).
    ///
    /// # Errors
    ///
    /// `Overlay` if any input is empty or the join matches nothing.
    pub fn flood_pop_overlay(
        &self,
        population: &[PopulationRecord],
        boundaries: &[Region],
        hazards: &[HazardPolygon],
    ) -> Result<Vec<ExposureResult>> {
        if population.is_empty() || boundaries.is_empty() {
            return Err(FloodlineError::Overlay(
                "Population overlay needs population rows and boundaries".to_string(),
            ));
        }
        if hazards.is_empty() {
            return Err(FloodlineError::Overlay(
                "Population overlay needs at least one hazard polygon".to_string(),
            ));
        }

        let mut counts: HashMap<&RegionCode, f64> = HashMap::with_capacity(population.len());
        for record in population {
            if counts.insert(&record.region, record.population).is_some() {
                tracing::warn!(region = %record.region, "Duplicate population row; last one wins");
            }
        }
        let joined: Vec<(&Region, f64)> = boundaries
            .iter()
            .filter_map(|r| counts.get(&r.code).map(|count| (r, *count)))
            .collect();
        if joined.len() < boundaries.len() || joined.len() < counts.len() {
            tracing::debug!(
                boundaries = boundaries.len(),
                population_rows = counts.len(),
                joined = joined.len(),
                "Dropped unmatched regions from population join"
            );
        }
        if joined.is_empty() {
            return Err(FloodlineError::Overlay(
                "No population row matches a boundary region code".to_string(),
            ));
        }

        let hazard_index = index_hazards(hazards);
        let mut results = Vec::new();
        for (region, count) in joined {
            let Some(region_box) = region.bounds() else {
                continue;
            };
            let region_area = region.geometry.unsigned_area();
            for (hazard, footprint, hazard_box) in &hazard_index {
                if !region_box.intersects(hazard_box) {
                    continue;
                }
                let Some(geometry) = intersect(&region.geometry, footprint)? else {
                    continue;
                };
                let share = if region_area > 0.0 {
                    geometry.unsigned_area() / region_area
                } else {
                    0.0
                };
                results.push(ExposureResult {
                    region: region.code.clone(),
                    hazard: hazard.hazard.clone(),
                    intensity: hazard.intensity,
                    geometry,
                    attribute: ExposureAttribute::Population {
                        count,
                        exposed: count * share,
                    },
                });
            }
        }
        Ok(results)
    }

    /// Intersects coverage footprints with hazard polygons
    ///
    /// Results are keyed by the region of the hazard polygon and carry the
    /// coverage technology.
    ///
    /// # Errors
    ///
    /// `Overlay` if either input is empty.
    pub fn coverage_overlay(
        &self,
        coverage: &[CoverageRecord],
        hazards: &[HazardPolygon],
    ) -> Result<Vec<ExposureResult>> {
        if coverage.is_empty() || hazards.is_empty() {
            return Err(FloodlineError::Overlay(
                "Coverage overlay needs coverage footprints and hazard polygons".to_string(),
            ));
        }

        let hazard_index = index_hazards(hazards);
        let mut results = Vec::new();
        for record in coverage {
            let Some(coverage_box) = record.geometry.bounding_rect() else {
                continue;
            };
            for (hazard, footprint, hazard_box) in &hazard_index {
                if !coverage_box.intersects(hazard_box) {
                    continue;
                }
                let Some(geometry) = intersect(&record.geometry, footprint)? else {
                    continue;
                };
                results.push(ExposureResult {
                    region: hazard.region.clone(),
                    hazard: hazard.hazard.clone(),
                    intensity: hazard.intensity,
                    geometry,
                    attribute: ExposureAttribute::Coverage {
                        technology: record.technology.clone(),
                    },
                });
            }
        }
        Ok(results)
    }

    /// Writes population exposure for a country and hazard kind
    pub fn persist_population(
        &self,
        layout: &dyn Layout,
        country: &CountryCode,
        kind: HazardKind,
        results: &[ExposureResult],
    ) -> Result<PathBuf> {
        let path = layout.population_exposure(country, kind);
        write_exposure_results(&path, results)?;
        Ok(path)
    }

    /// Writes coverage exposure for a country, hazard kind and technology
    pub fn persist_coverage(
        &self,
        layout: &dyn Layout,
        country: &CountryCode,
        kind: HazardKind,
        technology: &str,
        results: &[ExposureResult],
    ) -> Result<PathBuf> {
        let path = layout.coverage_exposure(country, kind, technology);
        write_exposure_results(&path, results)?;
        Ok(path)
    }
}

fn index_hazards(hazards: &[HazardPolygon]) -> Vec<(&HazardPolygon, MultiPolygon<f64>, Rect<f64>)> {
    hazards
        .iter()
        .filter_map(|h| {
            let bbox = h.geometry.bounding_rect()?;
            Some((h, MultiPolygon::new(vec![h.geometry.clone()]), bbox))
        })
        .collect()
}

/// Intersection of two areal geometries, `None` when it has no area
///
/// A panic inside the clipping backend is turned into an `Overlay` error so
/// it skips the current item instead of unwinding through the batch.
fn intersect(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<Option<MultiPolygon<f64>>> {
    let shared = guarded(|| a.intersection(b))?;
    Ok((!shared.0.is_empty() && shared.unsigned_area() > 0.0).then_some(shared))
}

fn guarded<T>(op: impl FnOnce() -> T + panic::UnwindSafe) -> Result<T> {
    panic::catch_unwind(op).map_err(|cause| {
        let message = cause
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| cause.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        FloodlineError::Overlay(format!("Polygon intersection failed: {message}"))
    })
}

/// Entries of `dir` matching `keep`, sorted by path; a missing directory is empty
fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if keep(&path) {
            entries.push(path);
        }
    }
    entries.sort();
    Ok(entries)
}
