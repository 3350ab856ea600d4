//! Raster clipper
//!
//! Crops a hazard raster to the bounding window of a region and masks every
//! cell whose centre lies outside the region. Only the strips or tiles that
//! intersect the window are decoded, so clipping a small region out of a
//! global hazard layer stays cheap.

use crate::adapters::geotiff::{self, GeoTiffReader, PixelWindow};
use crate::adapters::Layout;
use crate::config::HazardConfig;
use crate::domain::{
    Affine, ClippedRaster, CountryCode, FloodlineError, HazardId, HazardKind, HazardRaster, Region,
    Result,
};
use geo::{LineString, Rect};
use std::path::{Path, PathBuf};

/// Clips hazard rasters to administrative regions
#[derive(Debug, Clone)]
pub struct RasterClipper {
    nodata: f32,
    epsg: u16,
}

impl RasterClipper {
    /// Creates a clipper forcing `nodata` as the sentinel of every output
    pub fn new(nodata: f32, epsg: u16) -> Self {
        Self { nodata, epsg }
    }

    pub fn from_config(config: &HazardConfig) -> Self {
        Self::new(config.nodata, config.epsg)
    }

    pub fn nodata(&self) -> f32 {
        self.nodata
    }

    /// Clips the raster at `path` to `region`
    ///
    /// A region that does not intersect the raster extent yields an empty
    /// [`ClippedRaster`]; that is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// - `DataNotFound` if the raster does not exist
    /// - `MalformedRaster` if it cannot be decoded
    /// - `Validation` if the raster is not in the configured CRS
    pub fn clip(&self, path: &Path, region: &Region) -> Result<ClippedRaster> {
        let mut reader = GeoTiffReader::open(path)?;
        let info = reader.info().clone();
        self.check_crs(info.epsg, path)?;

        let Some(window) = self.window_for(&info.transform, info.width, info.height, region)? else {
            return Ok(self.empty(region, info.transform));
        };

        let mut data = reader.read_window(window, self.nodata)?;
        for value in data.iter_mut() {
            if value.is_nan() || info.nodata == Some(*value) {
                *value = self.nodata;
            }
        }
        drop(reader);

        let transform = info.transform.translate_pixels(window.col_off, window.row_off);
        self.finish(region, window, data, transform)
    }

    /// Clips an in-memory raster to `region`
    pub fn clip_raster(&self, raster: &HazardRaster, region: &Region) -> Result<ClippedRaster> {
        let transform = *raster.transform();
        let Some(window) = self.window_for(&transform, raster.width(), raster.height(), region)?
        else {
            return Ok(self.empty(region, transform));
        };

        let mut data = Vec::with_capacity(window.width * window.height);
        for row in window.row_off..window.row_off + window.height {
            for col in window.col_off..window.col_off + window.width {
                let value = raster.get(col, row).unwrap_or(self.nodata);
                data.push(if raster.is_valid(value) { value } else { self.nodata });
            }
        }
        let transform = transform.translate_pixels(window.col_off, window.row_off);
        self.finish(region, window, data, transform)
    }

    /// Writes a clipped raster under the layout, keyed by its region
    ///
    /// Empty clips have nothing to persist and return `None`.
    pub fn persist(
        &self,
        layout: &dyn Layout,
        country: &CountryCode,
        kind: HazardKind,
        hazard: &HazardId,
        clipped: &ClippedRaster,
    ) -> Result<Option<PathBuf>> {
        if clipped.is_empty() {
            return Ok(None);
        }
        let path = layout.clipped_raster(country, kind, hazard, &clipped.region);
        geotiff::write_raster(&path, &clipped.raster)?;
        tracing::debug!(path = %path.display(), region = %clipped.region, "Clipped raster written");
        Ok(Some(path))
    }

    fn check_crs(&self, epsg: Option<u16>, path: &Path) -> Result<()> {
        match epsg {
            Some(code) if code != self.epsg => Err(FloodlineError::Validation(format!(
                "{}: raster is EPSG:{} but regions are EPSG:{}",
                path.display(),
                code,
                self.epsg
            ))),
            _ => Ok(()),
        }
    }

    fn empty(&self, region: &Region, transform: Affine) -> ClippedRaster {
        ClippedRaster::new(
            region.code.clone(),
            HazardRaster::empty(transform, self.epsg, self.nodata),
        )
    }

    /// Minimal pixel window covering the region bounds, clamped to the grid
    fn window_for(
        &self,
        transform: &Affine,
        width: usize,
        height: usize,
        region: &Region,
    ) -> Result<Option<PixelWindow>> {
        let Some(bounds) = region.bounds() else {
            return Ok(None);
        };
        let inverse = transform.invert().ok_or_else(|| {
            FloodlineError::MalformedRaster("Raster transform is not invertible".to_string())
        })?;
        Ok(pixel_window(&inverse, bounds, width, height))
    }

    fn finish(
        &self,
        region: &Region,
        window: PixelWindow,
        mut data: Vec<f32>,
        transform: Affine,
    ) -> Result<ClippedRaster> {
        mask_outside(&mut data, window.width, window.height, &transform, region, self.nodata)?;
        let raster = HazardRaster::new(
            window.width,
            window.height,
            data,
            transform,
            self.epsg,
            self.nodata,
        )?;
        Ok(ClippedRaster::new(region.code.clone(), raster))
    }
}

fn pixel_window(inverse: &Affine, bounds: Rect<f64>, width: usize, height: usize) -> Option<PixelWindow> {
    let (min, max) = (bounds.min(), bounds.max());
    let corners = [
        inverse.apply(min.x, min.y),
        inverse.apply(min.x, max.y),
        inverse.apply(max.x, min.y),
        inverse.apply(max.x, max.y),
    ];
    let col_min = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let col_max = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let row_min = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let row_max = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let clamp = |v: f64, limit: usize| v.max(0.0).min(limit as f64) as usize;
    let col_start = clamp(col_min.floor(), width);
    let col_end = clamp(col_max.ceil(), width);
    let row_start = clamp(row_min.floor(), height);
    let row_end = clamp(row_max.ceil(), height);

    let window = PixelWindow::new(
        col_start,
        row_start,
        col_end.saturating_sub(col_start),
        row_end.saturating_sub(row_start),
    );
    (!window.is_empty()).then_some(window)
}

/// Sets every cell whose centre lies outside the region to `nodata`
///
/// Ring vertices are mapped into the window's pixel space, then each row is
/// scanned at its centre line: crossings with every ring edge are sorted and
/// taken pairwise (even-odd rule), which handles holes and multi-part regions
/// without a per-cell polygon test.
fn mask_outside(
    data: &mut [f32],
    width: usize,
    height: usize,
    transform: &Affine,
    region: &Region,
    nodata: f32,
) -> Result<()> {
    let inverse = transform.invert().ok_or_else(|| {
        FloodlineError::MalformedRaster("Raster transform is not invertible".to_string())
    })?;
    let rings: Vec<Vec<(f64, f64)>> = region
        .geometry
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .map(|ring: &LineString<f64>| ring.coords().map(|c| inverse.apply(c.x, c.y)).collect())
        .collect();

    let mut crossings = Vec::new();
    for row in 0..height {
        let py = row as f64 + 0.5;
        crossings.clear();
        for ring in &rings {
            for edge in ring.windows(2) {
                let ((x0, y0), (x1, y1)) = (edge[0], edge[1]);
                if (y0 > py) != (y1 > py) {
                    crossings.push(x0 + (py - y0) * (x1 - x0) / (y1 - y0));
                }
            }
        }
        crossings.sort_by(f64::total_cmp);

        let line = &mut data[row * width..(row + 1) * width];
        let mut inside = vec![false; width];
        for pair in crossings.chunks_exact(2) {
            // Cell centres at col + 0.5 within [enter, exit)
            let first = (pair[0] - 0.5).ceil().max(0.0) as usize;
            let last = (pair[1] - 0.5).ceil().max(0.0).min(width as f64) as usize;
            for flag in inside.iter_mut().take(last).skip(first) {
                *flag = true;
            }
        }
        for (value, keep) in line.iter_mut().zip(inside) {
            if !keep {
                *value = nodata;
            }
        }
    }
    Ok(())
}
