//! Hazard raster grids and their georeferencing

use super::ids::RegionCode;
use crate::domain::{FloodlineError, Result};
use geo::{coord, Rect};

/// Default no-data sentinel used by the hazard datasets
pub const DEFAULT_NODATA: f32 = 255.0;

/// Geographic CRS every input is assumed to be in
pub const WGS84_EPSG: u16 = 4326;

/// Affine pixel-to-world transform
///
/// Maps a pixel corner `(col, row)` to world coordinates:
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// North-up rasters have `b == d == 0` and a negative `e`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    /// Creates a transform from its six coefficients
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform anchored at the top-left corner `(west, north)`
    pub fn from_origin(west: f64, north: f64, x_res: f64, y_res: f64) -> Self {
        Self::new(x_res, 0.0, west, 0.0, -y_res, north)
    }

    /// Maps pixel coordinates to world coordinates
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Inverse transform (world to pixel), `None` if the transform is singular
    pub fn invert(&self) -> Option<Affine> {
        let det = self.a * self.e - self.b * self.d;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let ia = self.e / det;
        let ib = -self.b / det;
        let id = -self.d / det;
        let ie = self.a / det;
        Some(Affine::new(
            ia,
            ib,
            -(ia * self.c + ib * self.f),
            id,
            ie,
            -(id * self.c + ie * self.f),
        ))
    }

    /// Transform of a window whose top-left pixel is `(col_off, row_off)`
    pub fn translate_pixels(&self, col_off: usize, row_off: usize) -> Affine {
        let (c, f) = self.apply(col_off as f64, row_off as f64);
        Affine { c, f, ..*self }
    }

    /// Pixel size along x and y, always positive
    pub fn resolution(&self) -> (f64, f64) {
        (self.a.hypot(self.d), self.b.hypot(self.e))
    }

    /// True when the grid is axis aligned
    pub fn is_rectilinear(&self) -> bool {
        self.b == 0.0 && self.d == 0.0
    }
}

/// Single-band grid of hazard intensities
#[derive(Debug, Clone, PartialEq)]
pub struct HazardRaster {
    width: usize,
    height: usize,
    data: Vec<f32>,
    transform: Affine,
    epsg: u16,
    nodata: f32,
}

impl HazardRaster {
    /// Creates a raster from row-major cell values
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `data.len() != width * height`
    pub fn new(
        width: usize,
        height: usize,
        data: Vec<f32>,
        transform: Affine,
        epsg: u16,
        nodata: f32,
    ) -> Result<Self> {
        if data.len() != width * height {
            return Err(FloodlineError::Validation(format!(
                "Raster buffer holds {} cells but {}x{} were declared",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            transform,
            epsg,
            nodata,
        })
    }

    /// A zero-area raster that keeps the source georeferencing
    pub fn empty(transform: Affine, epsg: u16, nodata: f32) -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
            transform,
            epsg,
            nodata,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn transform(&self) -> &Affine {
        &self.transform
    }

    pub fn epsg(&self) -> u16 {
        self.epsg
    }

    pub fn nodata(&self) -> f32 {
        self.nodata
    }

    /// Row-major cell values
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value at `(col, row)`, `None` outside the grid
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Whether a value is a real measurement (not the sentinel, not NaN)
    pub fn is_valid(&self, value: f32) -> bool {
        !value.is_nan() && value != self.nodata
    }

    /// Number of cells holding a real measurement
    pub fn valid_cell_count(&self) -> usize {
        self.data.iter().filter(|v| self.is_valid(**v)).count()
    }

    /// Zero-area grid or a grid with no real measurement
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.valid_cell_count() == 0
    }

    /// World-space extent of the grid
    pub fn bounds(&self) -> Option<Rect<f64>> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let corners = [
            self.transform.apply(0.0, 0.0),
            self.transform.apply(self.width as f64, 0.0),
            self.transform.apply(0.0, self.height as f64),
            self.transform.apply(self.width as f64, self.height as f64),
        ];
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Rect::new(
            coord! { x: min_x, y: min_y },
            coord! { x: max_x, y: max_y },
        ))
    }
}

/// A hazard raster cropped and masked to one region
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedRaster {
    /// Region the raster was clipped to
    pub region: RegionCode,
    /// Cropped grid; cells outside the region hold the no-data sentinel
    pub raster: HazardRaster,
}

impl ClippedRaster {
    pub fn new(region: RegionCode, raster: HazardRaster) -> Self {
        Self { region, raster }
    }

    /// True when the clip produced nothing worth vectorizing
    pub fn is_empty(&self) -> bool {
        self.raster.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affine_apply_north_up() {
        let t = Affine::from_origin(10.0, 50.0, 0.5, 0.25);
        assert_eq!(t.apply(0.0, 0.0), (10.0, 50.0));
        assert_eq!(t.apply(2.0, 4.0), (11.0, 49.0));
    }

    #[test]
    fn test_affine_invert_round_trip() {
        let t = Affine::new(0.5, 0.1, 10.0, 0.05, -0.25, 50.0);
        let inv = t.invert().unwrap();
        let (x, y) = t.apply(3.0, 7.0);
        let (col, row) = inv.apply(x, y);
        assert!((col - 3.0).abs() < 1e-9);
        assert!((row - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_affine_singular_has_no_inverse() {
        assert!(Affine::new(0.0, 0.0, 1.0, 0.0, 0.0, 1.0).invert().is_none());
    }

    #[test]
    fn test_affine_translate_pixels() {
        let t = Affine::from_origin(-180.0, 90.0, 1.0, 1.0).translate_pixels(10, 20);
        assert_eq!(t.c, -170.0);
        assert_eq!(t.f, 70.0);
        assert_eq!(t.resolution(), (1.0, 1.0));
    }

    #[test]
    fn test_raster_rejects_wrong_buffer_size() {
        let t = Affine::from_origin(0.0, 0.0, 1.0, 1.0);
        assert!(HazardRaster::new(2, 2, vec![0.0; 3], t, WGS84_EPSG, DEFAULT_NODATA).is_err());
    }

    #[test]
    fn test_raster_validity_and_emptiness() {
        let t = Affine::from_origin(0.0, 2.0, 1.0, 1.0);
        let raster =
            HazardRaster::new(2, 2, vec![255.0, 255.0, f32::NAN, 255.0], t, 4326, 255.0).unwrap();
        assert!(raster.is_empty());
        assert_eq!(raster.valid_cell_count(), 0);

        let raster = HazardRaster::new(2, 2, vec![3.0, 255.0, 0.0, 255.0], t, 4326, 255.0).unwrap();
        assert!(!raster.is_empty());
        assert_eq!(raster.valid_cell_count(), 2);
        assert_eq!(raster.get(0, 1), Some(0.0));
        assert_eq!(raster.get(2, 0), None);
    }

    #[test]
    fn test_raster_bounds() {
        let t = Affine::from_origin(-10.0, 5.0, 0.5, 0.5);
        let raster = HazardRaster::new(4, 2, vec![1.0; 8], t, 4326, 255.0).unwrap();
        let b = raster.bounds().unwrap();
        assert_eq!((b.min().x, b.min().y), (-10.0, 4.0));
        assert_eq!((b.max().x, b.max().y), (-8.0, 5.0));
        assert!(HazardRaster::empty(t, 4326, 255.0).bounds().is_none());
    }
}
