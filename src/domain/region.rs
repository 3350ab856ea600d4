//! Administrative regions

use super::ids::{AdminLevel, RegionCode};
use geo::{BoundingRect, MultiPolygon, Rect};

/// A named administrative unit with its boundary in EPSG:4326
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Hierarchical region code
    pub code: RegionCode,
    /// Administrative level the code belongs to
    pub level: AdminLevel,
    /// Boundary geometry (single polygons are promoted on load)
    pub geometry: MultiPolygon<f64>,
}

impl Region {
    /// Creates a new region
    pub fn new(code: RegionCode, level: AdminLevel, geometry: MultiPolygon<f64>) -> Self {
        Self {
            code,
            level,
            geometry,
        }
    }

    /// Bounding rectangle of the boundary, `None` for an empty geometry
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_region_bounds() {
        let region = Region::new(
            RegionCode::new("USA.1_1").unwrap(),
            AdminLevel::new(1).unwrap(),
            MultiPolygon::new(vec![polygon![
                (x: -1.0, y: -2.0),
                (x: 3.0, y: -2.0),
                (x: 3.0, y: 4.0),
                (x: -1.0, y: 4.0),
            ]]),
        );
        let rect = region.bounds().unwrap();
        assert_eq!(rect.min().x, -1.0);
        assert_eq!(rect.max().y, 4.0);
    }

    #[test]
    fn test_empty_region_has_no_bounds() {
        let region = Region::new(
            RegionCode::new("USA.2_1").unwrap(),
            AdminLevel::new(1).unwrap(),
            MultiPolygon::new(vec![]),
        );
        assert!(region.bounds().is_none());
    }
}
