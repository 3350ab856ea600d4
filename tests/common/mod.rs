//! Shared fixtures for integration tests
//!
//! Builds a small on-disk data tree for country `TST`: a 4x4 hazard raster,
//! two level-1 regions splitting it in half, a population table and a GSM
//! coverage layer over the top row.

#![allow(dead_code)]

use floodline::adapters::geotiff::write_raster;
use floodline::config::{load_config, FloodlineConfig};
use floodline::domain::{Affine, HazardRaster, WGS84_EPSG};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HAZARD_FILE: &str = "inunriver_rp00100";

/// Row-major cells; 255 is no-data
pub const CELLS: [f32; 16] = [
    1.0, 0.0, 0.0, 1.0, //
    1.0, 0.0, 0.0, 1.0, //
    2.0, 0.0, 0.0, 0.0, //
    2.0, 0.0, 0.0, 255.0,
];

pub struct Fixture {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl Fixture {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> FloodlineConfig {
        load_config(&self.config_path).unwrap()
    }

    pub fn processed(&self) -> PathBuf {
        self.root().join("processed")
    }

    pub fn results(&self) -> PathBuf {
        self.root().join("results")
    }

    pub fn vectors_dir(&self) -> PathBuf {
        self.processed()
            .join("TST/hazards/river")
            .join(HAZARD_FILE)
            .join("vectors")
    }

    pub fn tifs_dir(&self) -> PathBuf {
        self.processed()
            .join("TST/hazards/river")
            .join(HAZARD_FILE)
            .join("tifs")
    }
}

fn square_feature(code: &str, west: f64, east: f64) -> String {
    format!(
        r#"{{"type":"Feature","properties":{{"GID_0":"TST","GID_1":"{code}"}},
           "geometry":{{"type":"Polygon","coordinates":[[[{west},0],[{east},0],[{east},4],[{west},4],[{west},0]]]}}}}"#
    )
}

/// Writes the data tree and a config pointing at it
pub fn fixture(dry_run: bool) -> Fixture {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    let raw = root.join("raw").join("flood_hazard");
    fs::create_dir_all(&raw).unwrap();
    let raster = HazardRaster::new(
        4,
        4,
        CELLS.to_vec(),
        Affine::from_origin(0.0, 4.0, 1.0, 1.0),
        WGS84_EPSG,
        255.0,
    )
    .unwrap();
    write_raster(&raw.join(format!("{HAZARD_FILE}.tif")), &raster).unwrap();

    let country = root.join("processed").join("TST");
    fs::create_dir_all(country.join("regions")).unwrap();
    fs::write(
        country.join("regions").join("gadm_1.geojson"),
        format!(
            r#"{{"type":"FeatureCollection","features":[{},{}]}}"#,
            square_feature("TST.1_1", 0.0, 2.0),
            square_feature("TST.2_1", 2.0, 4.0)
        ),
    )
    .unwrap();

    fs::create_dir_all(country.join("population")).unwrap();
    fs::write(
        country.join("population").join("population.csv"),
        "GID_1,population\nTST.1_1,1000\nTST.2_1,400\n",
    )
    .unwrap();

    fs::create_dir_all(country.join("coverage")).unwrap();
    fs::write(
        country.join("coverage").join("GSM.geojson"),
        r#"{"type":"FeatureCollection","features":[
          {"type":"Feature","properties":{"tech":"GSM"},
           "geometry":{"type":"Polygon","coordinates":[[[0,3],[4,3],[4,4],[0,4],[0,3]]]}}
        ]}"#,
    )
    .unwrap();

    let config_path = root.join("floodline.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[application]
log_level = "debug"
dry_run = {dry_run}

[paths]
raw = "{raw}"
processed = "{processed}"
results = "{results}"
countries_csv = "{catalogue}"

[hazard]
nodata = 255.0
kinds = ["river"]

[coverage]
technologies = ["GSM"]

[selection]
countries = ["TST"]
"#,
            raw = toml_path(&root.join("raw")),
            processed = toml_path(&root.join("processed")),
            results = toml_path(&root.join("results")),
            catalogue = toml_path(&root.join("raw").join("countries.csv")),
        ),
    )
    .unwrap();

    Fixture { dir, config_path }
}

fn toml_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
