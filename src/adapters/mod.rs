//! Persistence and dataset adapters
//!
//! Every file the pipeline touches is read or written here:
//!
//! - [`layout`] - typed keys to file locations ([`Layout`] trait)
//! - [`geotiff`] - single-band GeoTIFF rasters
//! - [`vector`] - GeoJSON hazard polygons and exposure results
//! - [`boundaries`] - administrative regions per country and level
//! - [`population`] - population tables
//! - [`coverage`] - telecom coverage footprints
//! - [`countries`] - the country catalogue
//!
//! Adapters open a file, read or write it, and drop the handle before
//! returning, so no handle outlives a call.
//!
//! # Example
//!
//! ```rust,no_run
//! use floodline::adapters::{boundaries, DirectoryLayout};
//! use floodline::domain::{AdminLevel, CountryCode};
//!
//! # fn example() -> floodline::domain::Result<()> {
//! let layout = DirectoryLayout::new("data/raw", "data/processed", "data/results");
//! let country = CountryCode::new("KEN").map_err(floodline::domain::FloodlineError::Validation)?;
//! let regions = boundaries::load_regions(&layout, &country, AdminLevel::new(1).unwrap(), "GID_")?;
//! println!("{} regions", regions.len());
//! # Ok(())
//! # }
//! ```

pub mod boundaries;
pub mod countries;
pub mod coverage;
pub mod geotiff;
pub mod layout;
pub mod population;
pub mod vector;

pub use countries::{CountryCatalog, CountryEntry};
pub use layout::{DirectoryLayout, Layout};
