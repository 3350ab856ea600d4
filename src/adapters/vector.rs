//! GeoJSON persistence for hazard polygons and exposure results

use crate::domain::{
    ExposureAttribute, ExposureResult, FloodlineError, HazardId, HazardPolygon, RegionCode, Result,
};
use geo::MultiPolygon;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde_json::{json, Value as JsonValue};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Attribute holding the hazard intensity on persisted polygons
pub const INTENSITY_PROPERTY: &str = "value";
const REGION_PROPERTY: &str = "region";
const HAZARD_PROPERTY: &str = "hazard";

/// Reads a GeoJSON file that must contain a FeatureCollection
///
/// # Errors
///
/// `DataNotFound` for a missing file, `InvalidData` for anything that is not
/// a FeatureCollection.
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    if !path.is_file() {
        return Err(FloodlineError::DataNotFound(format!(
            "Vector file not found: {}",
            path.display()
        )));
    }
    let reader = BufReader::new(File::open(path)?);
    let value: JsonValue = serde_json::from_reader(reader)?;
    match GeoJson::from_json_value(value)? {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => Err(FloodlineError::InvalidData(format!(
            "{}: expected a FeatureCollection",
            path.display()
        ))),
    }
}

/// Writes features as a FeatureCollection, replacing any existing file
pub fn write_feature_collection(path: &Path, features: Vec<Feature>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &collection)?;
    writer.flush()?;
    Ok(())
}

/// Converts a feature geometry to a multipolygon
///
/// Polygons are promoted; any other geometry type is rejected.
pub fn feature_multipolygon(feature: &Feature) -> Result<MultiPolygon<f64>> {
    let geometry = feature
        .geometry
        .clone()
        .ok_or_else(|| FloodlineError::InvalidData("Feature has no geometry".to_string()))?;
    match geo::Geometry::<f64>::try_from(geometry)? {
        geo::Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p])),
        geo::Geometry::MultiPolygon(mp) => Ok(mp),
        _ => Err(FloodlineError::InvalidData(
            "Expected a Polygon or MultiPolygon geometry".to_string(),
        )),
    }
}

/// Reads a string-valued property; numeric values are stringified
pub fn string_property(feature: &Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn feature(geometry: geojson::Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Writes hazard polygons, one feature each
pub fn write_hazard_polygons(path: &Path, polygons: &[HazardPolygon]) -> Result<()> {
    let features = polygons
        .iter()
        .map(|p| {
            let mut props = JsonObject::new();
            props.insert(INTENSITY_PROPERTY.to_string(), json!(p.intensity));
            props.insert(REGION_PROPERTY.to_string(), json!(p.region.as_str()));
            props.insert(HAZARD_PROPERTY.to_string(), json!(p.hazard.as_str()));
            feature(geojson::Value::from(&p.geometry), props)
        })
        .collect();
    write_feature_collection(path, features)
}

/// Reads hazard polygons written by [`write_hazard_polygons`]
///
/// Multipolygon features are split into one hazard polygon per part. Features
/// without region or hazard attributes fall back to `fallback_region` and
/// `fallback_hazard`, which the caller derives from the file location.
pub fn read_hazard_polygons(
    path: &Path,
    fallback_region: &RegionCode,
    fallback_hazard: &HazardId,
) -> Result<Vec<HazardPolygon>> {
    let collection = read_feature_collection(path)?;
    let mut polygons = Vec::new();
    for feature in &collection.features {
        let intensity = feature
            .property(INTENSITY_PROPERTY)
            .and_then(JsonValue::as_f64)
            .ok_or_else(|| {
                FloodlineError::InvalidData(format!(
                    "{}: feature without numeric '{}' attribute",
                    path.display(),
                    INTENSITY_PROPERTY
                ))
            })?;
        let region = string_property(feature, REGION_PROPERTY)
            .and_then(|s| RegionCode::new(s).ok())
            .unwrap_or_else(|| fallback_region.clone());
        let hazard = string_property(feature, HAZARD_PROPERTY)
            .and_then(|s| HazardId::new(s).ok())
            .unwrap_or_else(|| fallback_hazard.clone());

        for polygon in feature_multipolygon(feature)? {
            polygons.push(HazardPolygon::new(
                polygon,
                intensity,
                region.clone(),
                hazard.clone(),
            ));
        }
    }
    Ok(polygons)
}

/// Writes exposure results with their combined attributes
pub fn write_exposure_results(path: &Path, results: &[ExposureResult]) -> Result<()> {
    let features = results
        .iter()
        .map(|r| {
            let mut props = JsonObject::new();
            props.insert(REGION_PROPERTY.to_string(), json!(r.region.as_str()));
            props.insert(HAZARD_PROPERTY.to_string(), json!(r.hazard.as_str()));
            props.insert(INTENSITY_PROPERTY.to_string(), json!(r.intensity));
            match &r.attribute {
                ExposureAttribute::Population { count, exposed } => {
                    props.insert("population".to_string(), json!(count));
                    props.insert("exposed_population".to_string(), json!(exposed));
                }
                ExposureAttribute::Coverage { technology } => {
                    props.insert("technology".to_string(), json!(technology));
                }
            }
            feature(geojson::Value::from(&r.geometry), props)
        })
        .collect();
    write_feature_collection(path, features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon};
    use tempfile::TempDir;

    fn square(x: f64, y: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ]
    }

    #[test]
    fn test_hazard_polygons_persist_with_attributes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vectors").join("KEN.1_1.geojson");
        let region = RegionCode::new("KEN.1_1").unwrap();
        let hazard = HazardId::new("rp0100").unwrap();
        let polygons = vec![
            HazardPolygon::new(square(0.0, 0.0), 2.0, region.clone(), hazard.clone()),
            HazardPolygon::new(square(3.0, 0.0), 0.5, region.clone(), hazard.clone()),
        ];

        write_hazard_polygons(&path, &polygons).unwrap();
        let other = RegionCode::new("OTHER").unwrap();
        let read = read_hazard_polygons(&path, &other, &hazard).unwrap();

        assert_eq!(read.len(), 2);
        assert_eq!(read[0].intensity, 2.0);
        assert_eq!(read[1].intensity, 0.5);
        assert_eq!(read[0].region, region);
        assert_eq!(read[1].geometry, polygons[1].geometry);
    }

    #[test]
    fn test_missing_vector_file_is_data_not_found() {
        let err = read_feature_collection(Path::new("/nonexistent/v.geojson")).unwrap_err();
        assert!(matches!(err, FloodlineError::DataNotFound(_)));
    }

    #[test]
    fn test_non_collection_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("point.geojson");
        std::fs::write(&path, r#"{"type":"Point","coordinates":[1.0,2.0]}"#).unwrap();
        assert!(matches!(
            read_feature_collection(&path),
            Err(FloodlineError::InvalidData(_))
        ));
    }

    #[test]
    fn test_string_property_accepts_numbers() {
        let mut props = JsonObject::new();
        props.insert("GID_0".to_string(), json!(404));
        let f = feature(geojson::Value::from(&square(0.0, 0.0)), props);
        assert_eq!(string_property(&f, "GID_0").as_deref(), Some("404"));
        assert_eq!(string_property(&f, "missing"), None);
    }

    #[test]
    fn test_exposure_results_written_with_layer_attributes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("population.geojson");
        let result = ExposureResult {
            region: RegionCode::new("KEN.1_1").unwrap(),
            hazard: HazardId::new("rp0100").unwrap(),
            intensity: 1.5,
            geometry: MultiPolygon::new(vec![square(0.0, 0.0)]),
            attribute: ExposureAttribute::Population {
                count: 1000.0,
                exposed: 250.0,
            },
        };
        write_exposure_results(&path, &[result]).unwrap();

        let fc = read_feature_collection(&path).unwrap();
        assert_eq!(fc.features.len(), 1);
        let f = &fc.features[0];
        assert_eq!(f.property("population").and_then(JsonValue::as_f64), Some(1000.0));
        assert_eq!(
            f.property("exposed_population").and_then(JsonValue::as_f64),
            Some(250.0)
        );
        assert_eq!(f.property("value").and_then(JsonValue::as_f64), Some(1.5));
    }
}
