//! Re-rasterizing traced polygons reproduces the source cells

use floodline::core::vectorize::RasterVectorizer;
use floodline::domain::{
    Affine, ClippedRaster, HazardId, HazardPolygon, HazardRaster, RegionCode, WGS84_EPSG,
};
use geo::{Contains, Point};
use test_case::test_case;

const NODATA: f32 = 255.0;

fn clipped(width: usize, cells: &[f32]) -> ClippedRaster {
    let height = cells.len() / width;
    let raster = HazardRaster::new(
        width,
        height,
        cells.to_vec(),
        Affine::from_origin(36.5, -1.0, 0.25, 0.25),
        WGS84_EPSG,
        NODATA,
    )
    .unwrap();
    ClippedRaster::new(RegionCode::new("KEN.30_1").unwrap(), raster)
}

/// Value of the polygon covering each cell centre, or `None`
fn rasterize(raster: &HazardRaster, polygons: &[HazardPolygon]) -> Vec<Option<f64>> {
    let mut cells = Vec::with_capacity(raster.width() * raster.height());
    for row in 0..raster.height() {
        for col in 0..raster.width() {
            let (x, y) = raster.transform().apply(col as f64 + 0.5, row as f64 + 0.5);
            let centre = Point::new(x, y);
            let covering: Vec<f64> = polygons
                .iter()
                .filter(|p| p.geometry.contains(&centre))
                .map(|p| p.intensity)
                .collect();
            assert!(covering.len() <= 1, "cell ({col}, {row}) covered {} times", covering.len());
            cells.push(covering.first().copied());
        }
    }
    cells
}

#[test_case(3, &[
    1.0, 1.0, 1.0,
    1.0, 1.0, 1.0,
] ; "uniform block")]
#[test_case(5, &[
    3.0, 3.0, 3.0, 3.0, 3.0,
    3.0, 1.0, 1.0, 1.0, 3.0,
    3.0, 1.0, 2.0, 1.0, 3.0,
    3.0, 1.0, 1.0, 1.0, 3.0,
    3.0, 3.0, 3.0, 3.0, 3.0,
] ; "nested rings")]
#[test_case(4, &[
    1.0, 2.0, 1.0, 2.0,
    2.0, 1.0, 2.0, 1.0,
    1.0, 2.0, 1.0, 2.0,
] ; "checkerboard")]
#[test_case(4, &[
    4.0, 4.0, 4.0, 0.0,
    4.0, 0.0, 4.0, 0.0,
    4.0, 4.0, 0.0, 4.0,
    0.0, 4.0, 4.0, 4.0,
] ; "pinched hole")]
#[test_case(5, &[
    255.0, 2.0, 2.0, 0.0, 7.0,
    2.0, 255.0, 2.0, 0.0, 7.0,
    2.0, 2.0, 2.0, 255.0, 7.0,
    0.0, 0.0, 9.0, 9.0, 0.0,
] ; "mixed with no-data")]
fn test_rasterized_polygons_match_cells(width: usize, cells: &[f32]) {
    let clip = clipped(width, cells);
    let hazard = HazardId::new("inunriver_rp00100").unwrap();
    let polygons: Vec<HazardPolygon> = RasterVectorizer::new(NODATA, WGS84_EPSG)
        .vectorize(&clip, &hazard)
        .collect();

    let rasterized = rasterize(&clip.raster, &polygons);

    for (index, (&source, traced)) in cells.iter().zip(&rasterized).enumerate() {
        if source == NODATA || source <= 0.0 {
            assert_eq!(*traced, None, "cell {index} should be uncovered");
        } else {
            assert_eq!(*traced, Some(source as f64), "cell {index}");
        }
    }
}

#[test]
fn test_uniform_nodata_has_no_polygons() {
    let clip = clipped(3, &[NODATA; 9]);
    let hazard = HazardId::new("inuncoast_rp0010").unwrap();
    assert_eq!(RasterVectorizer::new(NODATA, WGS84_EPSG).vectorize(&clip, &hazard).count(), 0);
}

#[test]
fn test_polygon_area_matches_cell_count() {
    use geo::Area;

    let cells = [
        1.0, 1.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 1.0,
    ];
    let clip = clipped(3, &cells);
    let hazard = HazardId::new("inunriver_rp00100").unwrap();
    let polygons: Vec<HazardPolygon> = RasterVectorizer::new(NODATA, WGS84_EPSG)
        .vectorize(&clip, &hazard)
        .collect();

    assert_eq!(polygons.len(), 1);
    let cell_area = 0.25 * 0.25;
    assert!((polygons[0].geometry.unsigned_area() - 6.0 * cell_area).abs() < 1e-12);
}
