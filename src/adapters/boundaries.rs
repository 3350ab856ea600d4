//! Region loader over per-country boundary datasets

use super::layout::Layout;
use super::vector::{feature_multipolygon, read_feature_collection, string_property};
use crate::domain::{AdminLevel, CountryCode, FloodlineError, Region, RegionCode, Result};

/// Loads the administrative regions of a country at one level
///
/// Regions are returned in file order. Each feature must carry the code
/// attribute for the level (`{prefix}{level}`, e.g. `GID_1`) and a polygon or
/// multipolygon geometry.
///
/// # Errors
///
/// - `DataNotFound` if the boundary file for the country/level does not exist
/// - `InvalidData` if a feature lacks its code or has a non-areal geometry
pub fn load_regions(
    layout: &dyn Layout,
    country: &CountryCode,
    level: AdminLevel,
    code_column_prefix: &str,
) -> Result<Vec<Region>> {
    let path = layout.boundaries(country, level);
    let collection = read_feature_collection(&path).map_err(|e| match e {
        FloodlineError::DataNotFound(_) => FloodlineError::DataNotFound(format!(
            "No level {} boundaries for {}: {}",
            level,
            country,
            path.display()
        )),
        other => other,
    })?;

    let column = level.code_column(code_column_prefix);
    let mut regions = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.iter().enumerate() {
        let code = string_property(feature, &column)
            .ok_or_else(|| {
                FloodlineError::InvalidData(format!(
                    "{}: feature {} has no '{}' attribute",
                    path.display(),
                    index,
                    column
                ))
            })
            .and_then(|raw| RegionCode::new(raw).map_err(FloodlineError::InvalidData))?;
        let geometry = feature_multipolygon(feature).map_err(|e| {
            FloodlineError::InvalidData(format!("{}: region {}: {}", path.display(), code, e))
        })?;
        regions.push(Region::new(code, level, geometry));
    }

    tracing::debug!(
        country = %country,
        level = %level,
        regions = regions.len(),
        "Loaded regions"
    );
    Ok(regions)
}
