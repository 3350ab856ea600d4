//! Pipeline coordinator - runs the stages over countries, hazard files and regions
//!
//! Work is strictly sequential: one country, one hazard kind, one hazard file
//! and one region at a time. Each unit ends in an [`ItemReport`]; errors turn
//! into skips so the batch always runs to the end.

use super::summary::{ItemReport, RunSummary, SkipReason, Stage};
use crate::adapters::{boundaries, coverage, population, CountryCatalog, DirectoryLayout, Layout};
use crate::config::FloodlineConfig;
use crate::core::clip::RasterClipper;
use crate::core::overlay::OverlayEngine;
use crate::core::vectorize::RasterVectorizer;
use crate::domain::{
    AdminLevel, ClippedRaster, CountryCode, ExposureResult, FloodlineError, HazardId, HazardKind,
    HazardPolygon, ItemKey, RegionCode, Result,
};
use crate::log_stage_complete;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A country selected for processing, with the level its regions are read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryTarget {
    pub code: CountryCode,
    pub level: AdminLevel,
}

/// Runs clipping, vectorization and overlay under one configuration
pub struct Pipeline {
    config: FloodlineConfig,
    layout: Box<dyn Layout>,
    clipper: RasterClipper,
    vectorizer: RasterVectorizer,
    overlay: OverlayEngine,
}

impl Pipeline {
    /// Creates a pipeline over the directory layout described by `config`
    pub fn new(config: FloodlineConfig) -> Self {
        let layout = Box::new(DirectoryLayout::from_config(&config));
        Self::with_layout(config, layout)
    }

    /// Creates a pipeline over a custom layout
    pub fn with_layout(config: FloodlineConfig, layout: Box<dyn Layout>) -> Self {
        Self {
            clipper: RasterClipper::from_config(&config.hazard),
            vectorizer: RasterVectorizer::from_config(&config.hazard),
            overlay: OverlayEngine::new(),
            config,
            layout,
        }
    }

    pub fn layout(&self) -> &dyn Layout {
        self.layout.as_ref()
    }

    fn dry_run(&self) -> bool {
        self.config.application.dry_run
    }

    fn code_prefix(&self) -> &str {
        &self.config.boundaries.code_column_prefix
    }

    /// Countries to process for a hazard kind
    ///
    /// `only` restricts the run to one country. Otherwise the explicit
    /// `selection.countries` list wins over the catalogue's eligibility
    /// filter, and `selection.coastal_countries`, when set, replaces the list
    /// for coastal hazards. Levels come from the catalogue, falling back to
    /// `boundaries.default_level`.
    pub fn select_countries(
        &self,
        only: Option<&CountryCode>,
        kind: HazardKind,
    ) -> Result<Vec<CountryTarget>> {
        let selection = &self.config.selection;
        let explicit: Vec<&String> = match (only, kind) {
            (Some(_), _) => Vec::new(),
            (None, HazardKind::Coastal) if !selection.coastal_countries.is_empty() => {
                selection.coastal_countries.iter().collect()
            }
            (None, _) => selection.countries.iter().collect(),
        };

        let catalog_path = &self.config.paths.countries_csv;
        let catalog = if only.is_some() || !explicit.is_empty() {
            match CountryCatalog::load(catalog_path) {
                Ok(catalog) => catalog,
                Err(FloodlineError::DataNotFound(_)) => CountryCatalog::default(),
                Err(e) => return Err(e),
            }
        } else {
            CountryCatalog::load(catalog_path)?
        };
        let default_level =
            AdminLevel::new(self.config.boundaries.default_level).map_err(FloodlineError::Configuration)?;
        let target = |code: CountryCode| {
            let level = catalog
                .get(&code)
                .and_then(|e| e.level)
                .unwrap_or(default_level);
            CountryTarget { code, level }
        };

        if let Some(code) = only {
            return Ok(vec![target(code.clone())]);
        }
        if !explicit.is_empty() {
            return explicit
                .into_iter()
                .map(|c| {
                    CountryCode::new(c.as_str())
                        .map(&target)
                        .map_err(FloodlineError::Configuration)
                })
                .collect();
        }
        Ok(catalog
            .eligible(&selection.income_groups)
            .map(|e| target(e.code.clone()))
            .collect())
    }

    /// Runs every stage for the configured hazard kinds and countries
    ///
    /// Writes the run report under the results directory unless dry-run is
    /// set.
    pub fn run(&self, only: Option<&CountryCode>, kinds: &[HazardKind]) -> Result<RunSummary> {
        let start = Instant::now();
        let mut summary = RunSummary::new(self.dry_run());
        tracing::info!(dry_run = self.dry_run(), kinds = ?kinds, "Starting run");

        let mut seen: Vec<CountryCode> = Vec::new();
        for &kind in kinds {
            let targets = self.select_countries(only, kind)?;
            tracing::info!(kind = %kind, countries = targets.len(), "Processing hazard kind");
            for target in &targets {
                if !seen.contains(&target.code) {
                    seen.push(target.code.clone());
                }
                let polygons = self.clip_and_vectorize(target, kind, &mut summary);
                self.overlay_country(target, kind, polygons, &mut summary);
            }
        }
        summary.countries = seen.len();

        let summary = summary.with_duration(start.elapsed());
        if !self.dry_run() {
            self.write_report(&summary)?;
        }
        Ok(summary)
    }

    /// Clips every raw hazard file of `kind` to the regions of a country
    ///
    /// Clipped rasters are persisted; nothing is vectorized.
    pub fn clip_country(&self, target: &CountryTarget, kind: HazardKind) -> RunSummary {
        let start = Instant::now();
        let mut summary = RunSummary::new(self.dry_run());
        summary.countries = 1;
        self.for_each_clip(target, kind, &mut summary, |_, _, _| Ok(Stage::Clipped));
        summary.with_duration(start.elapsed())
    }

    /// Vectorizes every persisted clipped raster of a country and kind
    ///
    /// A raster that cannot be read is skipped; the others still run.
    pub fn vectorize_country(&self, country: &CountryCode, kind: HazardKind) -> RunSummary {
        let start = Instant::now();
        let mut summary = RunSummary::new(self.dry_run());
        summary.countries = 1;

        let root = self.layout.hazard_root(country, kind);
        let hazard_dirs = match list_dir(&root, |p| p.is_dir()) {
            Ok(dirs) => dirs,
            Err(e) => {
                let key = ItemKey::country(country.clone(), kind);
                summary.record(ItemReport::skipped(key, Stage::Loaded, SkipReason::from(&e)));
                return summary.with_duration(start.elapsed());
            }
        };
        for hazard_dir in hazard_dirs {
            let Ok(hazard) = HazardId::from_path(&hazard_dir) else {
                continue;
            };
            let tifs = self.layout.clipped_dir(country, kind, &hazard);
            let Ok(rasters) = list_dir(&tifs, |p| has_extension(p, "tif")) else {
                continue;
            };
            for path in rasters {
                let Some(region) = file_region(&path) else {
                    continue;
                };
                let key = ItemKey::country(country.clone(), kind)
                    .with_hazard(hazard.clone())
                    .with_region(region.clone());
                let started = Instant::now();
                let report = match self.vectorizer.vectorize_file(&path, &region, &hazard) {
                    Ok(polygons) => {
                        log_stage_complete!(key, Stage::Vectorized, polygons.len(), started.elapsed());
                        summary.polygons += polygons.len();
                        self.persist_vectors(key, &region, &polygons)
                    }
                    Err(e) => ItemReport::skipped(key, Stage::Vectorized, SkipReason::from(&e)),
                };
                summary.record(report);
            }
        }
        summary.with_duration(start.elapsed())
    }

    /// Overlays the persisted hazard polygons of a country with its layers
    pub fn overlay_stored(&self, target: &CountryTarget, kind: HazardKind) -> RunSummary {
        let start = Instant::now();
        let mut summary = RunSummary::new(self.dry_run());
        summary.countries = 1;
        self.overlay_country(target, kind, Vec::new(), &mut summary);
        summary.with_duration(start.elapsed())
    }

    /// Clip then vectorize every region, returning the polygons traced
    fn clip_and_vectorize(
        &self,
        target: &CountryTarget,
        kind: HazardKind,
        summary: &mut RunSummary,
    ) -> Vec<HazardPolygon> {
        let mut traced = Vec::new();
        self.for_each_clip(target, kind, summary, |key, clipped, hazard| {
            let started = Instant::now();
            let polygons: Vec<HazardPolygon> = self.vectorizer.vectorize(clipped, hazard).collect();
            log_stage_complete!(key, Stage::Vectorized, polygons.len(), started.elapsed());
            if !self.dry_run() {
                self.vectorizer.persist(
                    self.layout(),
                    &target.code,
                    kind,
                    hazard,
                    &clipped.region,
                    &polygons,
                )?;
            }
            traced.extend(polygons);
            Ok(if self.dry_run() { Stage::Vectorized } else { Stage::Persisted })
        });
        summary.polygons += traced.len();
        traced
    }

    /// Loads regions, lists raw hazard files and clips each pair
    ///
    /// `then` runs on every non-empty clip and returns the stage the item
    /// reached; its error skips that item only.
    fn for_each_clip<F>(&self, target: &CountryTarget, kind: HazardKind, summary: &mut RunSummary, mut then: F)
    where
        F: FnMut(&ItemKey, &ClippedRaster, &HazardId) -> Result<Stage>,
    {
        let country_key = ItemKey::country(target.code.clone(), kind);
        let regions = match boundaries::load_regions(
            self.layout(),
            &target.code,
            target.level,
            self.code_prefix(),
        ) {
            Ok(regions) => regions,
            Err(e) => {
                summary.record(ItemReport::skipped(country_key, Stage::Loaded, SkipReason::from(&e)));
                return;
            }
        };
        let rasters = match list_dir(&self.layout.raw_hazards(kind), |p| has_extension(p, "tif")) {
            Ok(files) => files,
            Err(e) => {
                summary.record(ItemReport::skipped(country_key, Stage::Loaded, SkipReason::from(&e)));
                return;
            }
        };
        tracing::info!(
            country = %target.code,
            kind = %kind,
            regions = regions.len(),
            hazard_files = rasters.len(),
            "Processing country"
        );

        for raster in &rasters {
            let hazard = match HazardId::from_path(raster) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(path = %raster.display(), error = %e, "Skipping hazard file");
                    continue;
                }
            };
            for region in &regions {
                let key = country_key
                    .clone()
                    .with_hazard(hazard.clone())
                    .with_region(region.code.clone());
                let started = Instant::now();
                let clipped = match self.clipper.clip(raster, region) {
                    Ok(clipped) => clipped,
                    Err(e) => {
                        summary.record(ItemReport::skipped(key, Stage::Clipped, SkipReason::from(&e)));
                        continue;
                    }
                };
                if clipped.is_empty() {
                    summary.record(ItemReport::skipped(key, Stage::Clipped, SkipReason::EmptyGeometry));
                    continue;
                }
                log_stage_complete!(
                    key,
                    Stage::Clipped,
                    clipped.raster.valid_cell_count(),
                    started.elapsed()
                );
                if !self.dry_run() {
                    if let Err(e) = self.clipper.persist(self.layout(), &target.code, kind, &hazard, &clipped) {
                        summary.record(ItemReport::skipped(key, Stage::Clipped, SkipReason::from(&e)));
                        continue;
                    }
                }
                let report = match then(&key, &clipped, &hazard) {
                    Ok(stage) => ItemReport::completed(key, stage),
                    Err(e) => ItemReport::skipped(key, Stage::Vectorized, SkipReason::from(&e)),
                };
                summary.record(report);
            }
        }
    }

    fn persist_vectors(&self, key: ItemKey, region: &RegionCode, polygons: &[HazardPolygon]) -> ItemReport {
        if self.dry_run() {
            return ItemReport::completed(key, Stage::Vectorized);
        }
        let Some(hazard) = key.hazard.clone() else {
            return ItemReport::skipped(
                key,
                Stage::Persisted,
                SkipReason::Failed("item key has no hazard".to_string()),
            );
        };
        match self
            .vectorizer
            .persist(self.layout(), &key.country, key.kind, &hazard, region, polygons)
        {
            Ok(_) => ItemReport::completed(key, Stage::Persisted),
            Err(e) => ItemReport::skipped(key, Stage::Persisted, SkipReason::from(&e)),
        }
    }

    /// Population and coverage overlays for one country and kind
    ///
    /// The hazard layer is the union of every persisted hazard file; in
    /// dry-run nothing was persisted, so the polygons traced in this run are
    /// used instead.
    fn overlay_country(
        &self,
        target: &CountryTarget,
        kind: HazardKind,
        traced: Vec<HazardPolygon>,
        summary: &mut RunSummary,
    ) {
        let key = ItemKey::country(target.code.clone(), kind);
        let hazards = if self.dry_run() {
            traced
        } else {
            match self.overlay.pop_flood(self.layout(), &target.code, kind) {
                Ok(polygons) => polygons,
                Err(e) => {
                    summary.record(ItemReport::skipped(key, Stage::Overlaid, SkipReason::from(&e)));
                    return;
                }
            }
        };
        if hazards.is_empty() {
            summary.record(ItemReport::skipped(key, Stage::Overlaid, SkipReason::EmptyGeometry));
            return;
        }

        let report = self.population_overlay(target, kind, &hazards, summary);
        summary.record(report);
        for technology in &self.config.coverage.technologies {
            let report = self.coverage_overlay(target, kind, technology, &hazards, summary);
            summary.record(report);
        }
    }

    fn population_overlay(
        &self,
        target: &CountryTarget,
        kind: HazardKind,
        hazards: &[HazardPolygon],
        summary: &mut RunSummary,
    ) -> ItemReport {
        let key = ItemKey::country(target.code.clone(), kind);
        let started = Instant::now();
        let results = match self.population_results(target, hazards) {
            Ok(results) => results,
            Err(e) => return ItemReport::skipped(key, Stage::Overlaid, SkipReason::from(&e)),
        };
        log_stage_complete!(key, Stage::Overlaid, results.len(), started.elapsed());
        if results.is_empty() {
            return ItemReport::skipped(key, Stage::Overlaid, SkipReason::EmptyGeometry);
        }

        summary.exposure_results += results.len();
        if self.dry_run() {
            return ItemReport::completed(key, Stage::Overlaid);
        }
        match self.overlay.persist_population(self.layout(), &target.code, kind, &results) {
            Ok(_) => ItemReport::completed(key, Stage::Persisted),
            Err(e) => ItemReport::skipped(key, Stage::Persisted, SkipReason::from(&e)),
        }
    }

    fn population_results(
        &self,
        target: &CountryTarget,
        hazards: &[HazardPolygon],
    ) -> Result<Vec<ExposureResult>> {
        let regions =
            boundaries::load_regions(self.layout(), &target.code, target.level, self.code_prefix())?;
        let code_column = self
            .config
            .population
            .code_column
            .clone()
            .unwrap_or_else(|| target.level.code_column(self.code_prefix()));
        let rows = population::read_population(
            &self.layout.population(&target.code),
            &code_column,
            &self.config.population.value_column,
        )?;
        self.overlay.flood_pop_overlay(&rows, &regions, hazards)
    }

    fn coverage_overlay(
        &self,
        target: &CountryTarget,
        kind: HazardKind,
        technology: &str,
        hazards: &[HazardPolygon],
        summary: &mut RunSummary,
    ) -> ItemReport {
        let key = ItemKey::country(target.code.clone(), kind);
        let results = coverage::read_coverage(&self.layout.coverage(&target.code, technology), technology)
            .and_then(|footprints| self.overlay.coverage_overlay(&footprints, hazards));
        let results = match results {
            Ok(results) => results,
            Err(e) => return ItemReport::skipped(key, Stage::Overlaid, SkipReason::from(&e)),
        };
        if results.is_empty() {
            return ItemReport::skipped(key, Stage::Overlaid, SkipReason::EmptyGeometry);
        }

        summary.exposure_results += results.len();
        if self.dry_run() {
            return ItemReport::completed(key, Stage::Overlaid);
        }
        match self
            .overlay
            .persist_coverage(self.layout(), &target.code, kind, technology, &results)
        {
            Ok(_) => ItemReport::completed(key, Stage::Persisted),
            Err(e) => ItemReport::skipped(key, Stage::Persisted, SkipReason::from(&e)),
        }
    }

    fn write_report(&self, summary: &RunSummary) -> Result<PathBuf> {
        let stamp = summary.started_at.format("%Y%m%dT%H%M%SZ").to_string();
        let path = self.layout.run_report(&stamp);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(&path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), summary)?;
        tracing::info!(path = %path.display(), "Run report written");
        Ok(path)
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext) || (ext == "tif" && e.eq_ignore_ascii_case("tiff")))
}

fn file_region(path: &Path) -> Option<RegionCode> {
    let stem = path.file_stem()?.to_str()?;
    RegionCode::new(stem).ok()
}

/// Sorted entries of `dir` matching `keep`
///
/// # Errors
///
/// `DataNotFound` when the directory does not exist.
fn list_dir(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(FloodlineError::DataNotFound(format!(
            "Directory not found: {}",
            dir.display()
        )));
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
