//! Domain models and types for Floodline.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`CountryCode`], [`RegionCode`], [`HazardId`], [`ItemKey`])
//! - **Raster types** ([`HazardRaster`], [`ClippedRaster`], [`Affine`])
//! - **Vector types** ([`Region`], [`HazardPolygon`], [`ExposureResult`])
//! - **Error types** ([`FloodlineError`]) and the [`Result`] alias
//!
//! # Type Safety
//!
//! Region, country and hazard identifiers are distinct newtypes so they
//! cannot be swapped by accident when building store paths:
//!
//! ```rust
//! use floodline::domain::{CountryCode, RegionCode};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let country = CountryCode::new("KEN")?;
//! let region = RegionCode::new("KEN.1_1")?;
//! // let wrong: CountryCode = region;  // Compile error!
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod exposure;
pub mod hazard;
pub mod ids;
pub mod raster;
pub mod region;
pub mod result;

pub use errors::FloodlineError;
pub use exposure::{CoverageRecord, ExposureAttribute, ExposureResult, PopulationRecord};
pub use hazard::HazardPolygon;
pub use ids::{AdminLevel, CountryCode, HazardId, HazardKind, ItemKey, RegionCode};
pub use raster::{Affine, ClippedRaster, HazardRaster, DEFAULT_NODATA, WGS84_EPSG};
pub use region::Region;
pub use result::Result;
