//! Population overlay against boundary-shaped regions
//!
//! Real boundaries have off-grid, non-rectilinear vertices, some of them
//! lying exactly on hazard cell lines. These cases trace a fully valid hazard
//! grid at its native resolution and check that the intersections complete
//! and partition each region.

use floodline::core::overlay::OverlayEngine;
use floodline::core::vectorize::RasterVectorizer;
use floodline::domain::{
    Affine, AdminLevel, ClippedRaster, ExposureAttribute, HazardId, HazardPolygon, HazardRaster,
    PopulationRecord, Region, RegionCode, DEFAULT_NODATA, WGS84_EPSG,
};
use geo::{Area, LineString, MultiPolygon, Polygon};
use test_case::test_case;

const ARC_30S: f64 = 1.0 / 120.0;
const GHANA_WEST: f64 = -1.5083333333333333;
const GHANA_NORTH: f64 = 11.166666666666666;
const SIZE: usize = 6;

/// Every cell valid; the 1s form a ring around a hole of 3s and a 2
#[rustfmt::skip]
const CELLS: [f32; SIZE * SIZE] = [
    1.0, 1.0, 1.0, 1.0, 2.0, 2.0,
    1.0, 3.0, 3.0, 1.0, 2.0, 3.0,
    1.0, 3.0, 2.0, 1.0, 2.0, 3.0,
    1.0, 1.0, 1.0, 1.0, 3.0, 3.0,
    2.0, 2.0, 3.0, 1.0, 1.0, 2.0,
    2.0, 3.0, 3.0, 3.0, 1.0, 2.0,
];

fn traced_grid(west: f64, north: f64, res: f64) -> Vec<HazardPolygon> {
    let raster = HazardRaster::new(
        SIZE,
        SIZE,
        CELLS.to_vec(),
        Affine::from_origin(west, north, res, res),
        WGS84_EPSG,
        DEFAULT_NODATA,
    )
    .unwrap();
    let clipped = ClippedRaster::new(RegionCode::new("GHA.1_1").unwrap(), raster);
    RasterVectorizer::new(DEFAULT_NODATA, WGS84_EPSG)
        .vectorize(&clipped, &HazardId::new("inunriver_rp00100").unwrap())
        .collect()
}

fn region(coords: Vec<(f64, f64)>) -> Region {
    Region::new(
        RegionCode::new("GHA.1_1").unwrap(),
        AdminLevel::new(1).unwrap(),
        MultiPolygon::new(vec![Polygon::new(LineString::from(coords), vec![])]),
    )
}

fn snapped_pentagon() -> Vec<(f64, f64)> {
    let at = |cols: f64, rows: f64| (GHANA_WEST + cols * ARC_30S, GHANA_NORTH - rows * ARC_30S);
    vec![
        at(0.5, 0.3),
        at(3.0, 1.0),
        at(5.7, 2.2),
        at(4.0, 5.5),
        at(1.0, 4.0),
    ]
}

#[test_case(
    GHANA_WEST, GHANA_NORTH, ARC_30S,
    vec![
        (-1.4583333333333333, 11.141666666666666),
        (-1.4833333333333334, 11.166666666666666),
        (-1.4888312750000001, 11.141666666666666),
        (-1.4833333333333334, 11.119781875),
    ]
    ; "quadrilateral on cell lines near the prime meridian"
)]
#[test_case(GHANA_WEST, GHANA_NORTH, ARC_30S, snapped_pentagon() ; "pentagon with snapped vertices")]
#[test_case(
    0.0, 6.0, 1.0,
    vec![(-0.0, 3.5), (4.5, 0.25), (5.25, 5.75)]
    ; "negative zero vertex on the grid edge"
)]
fn test_overlay_partitions_region(west: f64, north: f64, res: f64, coords: Vec<(f64, f64)>) {
    let hazards = traced_grid(west, north, res);
    assert!(hazards.iter().any(|h| !h.geometry.interiors().is_empty()));
    let boundaries = vec![region(coords)];
    let population = vec![PopulationRecord {
        region: RegionCode::new("GHA.1_1").unwrap(),
        population: 5000.0,
    }];

    let results = OverlayEngine::new()
        .flood_pop_overlay(&population, &boundaries, &hazards)
        .unwrap();

    // The grid covers the whole region, so the pieces add back up to it
    let region_area = boundaries[0].geometry.unsigned_area();
    let covered: f64 = results.iter().map(|r| r.geometry.unsigned_area()).sum();
    assert!(
        (covered - region_area).abs() <= region_area * 1e-6,
        "covered {covered} of {region_area}"
    );

    let exposed: f64 = results
        .iter()
        .map(|r| match r.attribute {
            ExposureAttribute::Population { exposed, .. } => exposed,
            ExposureAttribute::Coverage { .. } => 0.0,
        })
        .sum();
    assert!((exposed - 5000.0).abs() < 1e-2, "exposed = {exposed}");
    assert!(results.iter().all(|r| r.intensity >= 1.0 && r.intensity <= 3.0));
}

#[test]
fn test_overlay_clips_hazards_outside_region() {
    let hazards = traced_grid(GHANA_WEST, GHANA_NORTH, ARC_30S);
    let grid_area = (SIZE as f64 * ARC_30S).powi(2);
    let traced: f64 = hazards.iter().map(|h| h.geometry.unsigned_area()).sum();
    assert!((traced - grid_area).abs() <= grid_area * 1e-9);

    let boundaries = vec![region(snapped_pentagon())];
    let population = vec![PopulationRecord {
        region: RegionCode::new("GHA.1_1").unwrap(),
        population: 1.0,
    }];
    let results = OverlayEngine::new()
        .flood_pop_overlay(&population, &boundaries, &hazards)
        .unwrap();

    let covered: f64 = results.iter().map(|r| r.geometry.unsigned_area()).sum();
    assert!(covered < grid_area);
    assert!(results.len() <= hazards.len());
}
