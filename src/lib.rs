// Floodline - Flood hazard clipping and exposure tool
// Copyright (c) 2025 Floodline Contributors
// Licensed under the MIT License

//! # Floodline - flood hazard clipping and exposure
//!
//! Floodline is a batch tool that turns global flood hazard rasters into
//! per-region hazard polygons and estimates how much population and network
//! coverage they touch.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Loading** administrative regions of a country at a given level
//! - **Clipping** a hazard raster to each region, masking cells outside it
//! - **Vectorizing** clipped rasters into polygons keyed by intensity
//! - **Overlaying** hazard polygons with population and coverage layers
//!
//! ## Architecture
//!
//! Floodline follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (clip, vectorize, overlay, pipeline)
//! - [`adapters`] - File formats and the on-disk layout (GeoTIFF, GeoJSON, CSV)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use floodline::config::load_config;
//! use floodline::core::pipeline::Pipeline;
//! use floodline::domain::HazardKind;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("floodline.toml")?;
//!     let pipeline = Pipeline::new(config);
//!
//!     let summary = pipeline.run(None, &HazardKind::ALL)?;
//!     println!("Traced {} polygons", summary.polygons);
//!     Ok(())
//! }
//! ```
//!
//! ## Single Stages
//!
//! Each stage can be driven on its own:
//!
//! ```rust,no_run
//! use floodline::core::clip::RasterClipper;
//! use floodline::core::vectorize::RasterVectorizer;
//! use floodline::domain::{HazardId, Region};
//! use std::path::Path;
//!
//! # fn example(region: &Region) -> Result<(), Box<dyn std::error::Error>> {
//! let clipper = RasterClipper::new(255.0, 4326);
//! let clipped = clipper.clip(Path::new("data/raw/flood_hazard/inunriver_rp00100.tif"), region)?;
//!
//! let hazard = HazardId::new("inunriver_rp00100")?;
//! for polygon in RasterVectorizer::new(255.0, 4326).vectorize(&clipped, &hazard) {
//!     println!("{} {}", polygon.region, polygon.intensity);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], aliased over
//! [`domain::FloodlineError`]. The pipeline never lets one item's error stop
//! the batch: it is recorded as a skip with a reason in the run summary.
//!
//! ## Logging
//!
//! Floodline uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(country = "KEN", regions = 47, "Processing country");
//! warn!(item = "KEN/river/rp100/KEN.1_1", "Item skipped");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
