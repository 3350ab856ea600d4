//! Core processing for Floodline.
//!
//! # Modules
//!
//! - [`clip`] - Crop hazard rasters to administrative regions
//! - [`vectorize`] - Trace clipped rasters into intensity polygons
//! - [`overlay`] - Intersect hazard polygons with population and coverage
//! - [`pipeline`] - Run the stages over countries, hazard files and regions
//!
//! # Workflow
//!
//! For every selected country and hazard kind:
//!
//! 1. **Load**: Read the country's regions at its administrative level
//! 2. **Clip**: Crop each raw hazard raster to each region and mask outside cells
//! 3. **Vectorize**: Trace equal-intensity polygons and persist them per region
//! 4. **Overlay**: Combine all hazard polygons with population and coverage layers
//! 5. **Report**: Record each item's outcome and write the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use floodline::config::load_config;
//! use floodline::core::pipeline::Pipeline;
//! use floodline::domain::HazardKind;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("floodline.toml")?;
//! let pipeline = Pipeline::new(config);
//!
//! let summary = pipeline.run(None, &HazardKind::ALL)?;
//!
//! println!("Completed: {}", summary.completed());
//! println!("Skipped: {}", summary.skipped());
//! # Ok(())
//! # }
//! ```

pub mod clip;
pub mod overlay;
pub mod pipeline;
pub mod vectorize;
