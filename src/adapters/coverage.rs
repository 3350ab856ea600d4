//! Telecom coverage footprints

use super::vector::{feature_multipolygon, read_feature_collection};
use crate::domain::{CoverageRecord, Result};
use std::path::Path;

/// Reads the coverage footprints of one technology
///
/// Every areal feature becomes one record tagged with `technology`; features
/// without a geometry or with a non-areal one are dropped.
pub fn read_coverage(path: &Path, technology: &str) -> Result<Vec<CoverageRecord>> {
    let collection = read_feature_collection(path)?;
    let total = collection.features.len();
    let records: Vec<CoverageRecord> = collection
        .features
        .iter()
        .filter_map(|f| feature_multipolygon(f).ok())
        .map(|geometry| CoverageRecord {
            technology: technology.to_string(),
            geometry,
        })
        .collect();

    if records.len() < total {
        tracing::warn!(
            path = %path.display(),
            dropped = total - records.len(),
            "Dropped coverage features without areal geometry"
        );
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FloodlineError;
    use tempfile::TempDir;

    #[test]
    fn test_reads_areal_features_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GSM.geojson");
        std::fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[
              {"type":"Feature","properties":{},
               "geometry":{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,2],[0,2],[0,0]]]}},
              {"type":"Feature","properties":{},
               "geometry":{"type":"Point","coordinates":[1,1]}}
            ]}"#,
        )
        .unwrap();

        let records = read_coverage(&path, "GSM").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].technology, "GSM");
    }

    #[test]
    fn test_missing_coverage_is_data_not_found() {
        assert!(matches!(
            read_coverage(Path::new("/nonexistent/3G.geojson"), "3G"),
            Err(FloodlineError::DataNotFound(_))
        ));
    }
}
