//! On-disk layout of inputs and stage outputs
//!
//! Components never build paths themselves; they ask a [`Layout`] for the
//! location of a typed key. [`DirectoryLayout`] is the scheme used by the
//! batch tool; tests and other callers may inject their own.

use crate::config::FloodlineConfig;
use crate::domain::{AdminLevel, CountryCode, HazardId, HazardKind, RegionCode};
use std::path::PathBuf;

/// Deterministic mapping from typed keys to file locations
pub trait Layout {
    /// Boundary dataset for a country at one administrative level
    fn boundaries(&self, country: &CountryCode, level: AdminLevel) -> PathBuf;

    /// Population table for a country
    fn population(&self, country: &CountryCode) -> PathBuf;

    /// Coverage footprints for a country and technology
    fn coverage(&self, country: &CountryCode, technology: &str) -> PathBuf;

    /// Directory holding the raw hazard rasters of one kind
    fn raw_hazards(&self, kind: HazardKind) -> PathBuf;

    /// Directory of clipped rasters for one country and hazard scenario
    fn clipped_dir(&self, country: &CountryCode, kind: HazardKind, hazard: &HazardId) -> PathBuf;

    /// Directory of hazard polygon files for one country and hazard scenario
    fn vector_dir(&self, country: &CountryCode, kind: HazardKind, hazard: &HazardId) -> PathBuf;

    /// Directory containing one sub-directory per hazard scenario
    fn hazard_root(&self, country: &CountryCode, kind: HazardKind) -> PathBuf;

    /// Population exposure results
    fn population_exposure(&self, country: &CountryCode, kind: HazardKind) -> PathBuf;

    /// Coverage exposure results for one technology
    fn coverage_exposure(&self, country: &CountryCode, kind: HazardKind, technology: &str) -> PathBuf;

    /// Run report written at the end of a batch
    fn run_report(&self, stamp: &str) -> PathBuf;

    /// Clipped raster file for one region
    fn clipped_raster(
        &self,
        country: &CountryCode,
        kind: HazardKind,
        hazard: &HazardId,
        region: &RegionCode,
    ) -> PathBuf {
        self.clipped_dir(country, kind, hazard)
            .join(format!("{}.tif", region.as_str()))
    }

    /// Hazard polygon file for one region
    fn hazard_vectors(
        &self,
        country: &CountryCode,
        kind: HazardKind,
        hazard: &HazardId,
        region: &RegionCode,
    ) -> PathBuf {
        self.vector_dir(country, kind, hazard)
            .join(format!("{}.geojson", region.as_str()))
    }
}

/// `raw/`, `processed/{ISO3}/...` and `results/{ISO3}/...` directory scheme
#[derive(Debug, Clone)]
pub struct DirectoryLayout {
    raw: PathBuf,
    processed: PathBuf,
    results: PathBuf,
    river_dir: String,
    coastal_dir: String,
    population_file: String,
}

impl DirectoryLayout {
    /// Layout rooted at explicit directories with default raw folder names
    pub fn new(raw: impl Into<PathBuf>, processed: impl Into<PathBuf>, results: impl Into<PathBuf>) -> Self {
        Self {
            raw: raw.into(),
            processed: processed.into(),
            results: results.into(),
            river_dir: "flood_hazard".to_string(),
            coastal_dir: "coastal_hazard".to_string(),
            population_file: "population.csv".to_string(),
        }
    }

    /// Layout described by the configuration
    pub fn from_config(config: &FloodlineConfig) -> Self {
        Self {
            raw: config.paths.raw.clone(),
            processed: config.paths.processed.clone(),
            results: config.paths.results.clone(),
            river_dir: config.hazard.river_dir.clone(),
            coastal_dir: config.hazard.coastal_dir.clone(),
            population_file: config.population.file_name.clone(),
        }
    }

    fn country_dir(&self, country: &CountryCode) -> PathBuf {
        self.processed.join(country.as_str())
    }
}

impl Layout for DirectoryLayout {
    fn boundaries(&self, country: &CountryCode, level: AdminLevel) -> PathBuf {
        self.country_dir(country)
            .join("regions")
            .join(format!("gadm_{}.geojson", level.get()))
    }

    fn population(&self, country: &CountryCode) -> PathBuf {
        self.country_dir(country)
            .join("population")
            .join(&self.population_file)
    }

    fn coverage(&self, country: &CountryCode, technology: &str) -> PathBuf {
        self.country_dir(country)
            .join("coverage")
            .join(format!("{technology}.geojson"))
    }

    fn raw_hazards(&self, kind: HazardKind) -> PathBuf {
        match kind {
            HazardKind::River => self.raw.join(&self.river_dir),
            HazardKind::Coastal => self.raw.join(&self.coastal_dir),
        }
    }

    fn clipped_dir(&self, country: &CountryCode, kind: HazardKind, hazard: &HazardId) -> PathBuf {
        self.hazard_root(country, kind).join(hazard.as_str()).join("tifs")
    }

    fn vector_dir(&self, country: &CountryCode, kind: HazardKind, hazard: &HazardId) -> PathBuf {
        self.hazard_root(country, kind)
            .join(hazard.as_str())
            .join("vectors")
    }

    fn hazard_root(&self, country: &CountryCode, kind: HazardKind) -> PathBuf {
        self.country_dir(country).join("hazards").join(kind.as_str())
    }

    fn population_exposure(&self, country: &CountryCode, kind: HazardKind) -> PathBuf {
        self.results
            .join(country.as_str())
            .join(kind.as_str())
            .join("population.geojson")
    }

    fn coverage_exposure(&self, country: &CountryCode, kind: HazardKind, technology: &str) -> PathBuf {
        self.results
            .join(country.as_str())
            .join(kind.as_str())
            .join(format!("coverage_{technology}.geojson"))
    }

    fn run_report(&self, stamp: &str) -> PathBuf {
        self.results.join(format!("run_{stamp}.json"))
    }
}
