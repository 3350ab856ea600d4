//! Single-band GeoTIFF reading and writing
//!
//! Only the georeferencing needed by the hazard pipeline is supported:
//! `ModelPixelScale` + `ModelTiepoint` or a full `ModelTransformation`, the
//! EPSG code from the GeoKey directory and the GDAL no-data tag. Reads go
//! through [`GeoTiffReader`], which decodes just the strips or tiles that
//! overlap the requested window. Every file handle lives only as long as the
//! reader or the single write call that opened it.

use crate::domain::{Affine, FloodlineError, HazardRaster, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::ColorType;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

const GT_MODEL_TYPE_KEY: u32 = 1024;
const GT_RASTER_TYPE_KEY: u32 = 1025;
const GEOGRAPHIC_TYPE_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_KEY: u32 = 3072;

const RASTER_PIXEL_IS_AREA: u16 = 1;
const RASTER_PIXEL_IS_POINT: u16 = 2;

fn geo_tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// A rectangular block of pixels, in pixel units of the source raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    pub fn new(col_off: usize, row_off: usize, width: usize, height: usize) -> Self {
        Self {
            col_off,
            row_off,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Georeferencing read from a GeoTIFF header
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTiffInfo {
    pub width: usize,
    pub height: usize,
    pub transform: Affine,
    pub epsg: Option<u16>,
    pub nodata: Option<f32>,
}

/// Open GeoTIFF with its header already parsed
pub struct GeoTiffReader {
    decoder: Decoder<BufReader<File>>,
    info: GeoTiffInfo,
}

impl GeoTiffReader {
    /// Opens a raster and parses its georeferencing
    ///
    /// # Errors
    ///
    /// - `DataNotFound` if the file does not exist
    /// - `MalformedRaster` if it is not a single-band, georeferenced TIFF
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(FloodlineError::DataNotFound(format!(
                "Raster not found: {}",
                path.display()
            )));
        }
        let file = File::open(path)?;
        let mut decoder = Decoder::new(BufReader::new(file))?.with_limits(Limits::unlimited());

        match decoder.colortype()? {
            ColorType::Gray(_) => {}
            other => {
                return Err(FloodlineError::MalformedRaster(format!(
                    "{}: expected a single-band raster, found {:?}",
                    path.display(),
                    other
                )))
            }
        }

        let (width, height) = decoder.dimensions()?;
        let keys = read_geo_keys(&mut decoder);
        let mut transform = read_transform(&mut decoder).ok_or_else(|| {
            FloodlineError::MalformedRaster(format!(
                "{}: missing GeoTIFF georeferencing tags",
                path.display()
            ))
        })?;
        if key_value(&keys, GT_RASTER_TYPE_KEY) == Some(u32::from(RASTER_PIXEL_IS_POINT)) {
            transform = point_to_area(transform);
        }
        let epsg = key_value(&keys, GEOGRAPHIC_TYPE_KEY)
            .or_else(|| key_value(&keys, PROJECTED_CS_TYPE_KEY))
            .and_then(|code| u16::try_from(code).ok());
        let nodata = decoder
            .find_tag(geo_tag(GDAL_NODATA))?
            .and_then(|v| v.into_string().ok())
            .and_then(|s| s.trim_matches(char::from(0)).trim().parse::<f32>().ok());

        Ok(Self {
            decoder,
            info: GeoTiffInfo {
                width: width as usize,
                height: height as usize,
                transform,
                epsg,
                nodata,
            },
        })
    }

    pub fn info(&self) -> &GeoTiffInfo {
        &self.info
    }

    /// Reads the cells of `window`, clamped to the raster extent
    ///
    /// Cells of the window that fall outside the raster are filled with `fill`.
    pub fn read_window(&mut self, window: PixelWindow, fill: f32) -> Result<Vec<f32>> {
        let mut out = vec![fill; window.width * window.height];
        if window.is_empty() || self.info.width == 0 || self.info.height == 0 {
            return Ok(out);
        }

        let (chunk_w, chunk_h) = self.decoder.chunk_dimensions();
        let (chunk_w, chunk_h) = (chunk_w.max(1) as usize, chunk_h.max(1) as usize);
        let chunks_across = self.info.width.div_ceil(chunk_w);

        let last_col = (window.col_off + window.width).min(self.info.width);
        let last_row = (window.row_off + window.height).min(self.info.height);
        if window.col_off >= last_col || window.row_off >= last_row {
            return Ok(out);
        }

        for chunk_row in window.row_off / chunk_h..=(last_row - 1) / chunk_h {
            for chunk_col in window.col_off / chunk_w..=(last_col - 1) / chunk_w {
                let index = (chunk_row * chunks_across + chunk_col) as u32;
                let values = to_f32(self.decoder.read_chunk(index)?)?;
                let (data_w, data_h) = self.decoder.chunk_data_dimensions(index);
                let (data_w, data_h) = (data_w as usize, data_h as usize);
                if data_h == 0 {
                    continue;
                }
                let stride = values.len() / data_h;

                let origin_col = chunk_col * chunk_w;
                let origin_row = chunk_row * chunk_h;
                for r in 0..data_h {
                    let row = origin_row + r;
                    if row < window.row_off || row >= last_row {
                        continue;
                    }
                    for c in 0..data_w.min(stride) {
                        let col = origin_col + c;
                        if col < window.col_off || col >= last_col {
                            continue;
                        }
                        out[(row - window.row_off) * window.width + (col - window.col_off)] =
                            values[r * stride + c];
                    }
                }
            }
        }

        Ok(out)
    }
}

/// Reads a whole raster, forcing `nodata` as its sentinel
///
/// Hazard files frequently omit the no-data tag, so the caller's value always
/// wins over whatever the header says.
pub fn read_raster(path: &Path, nodata: f32, default_epsg: u16) -> Result<HazardRaster> {
    let mut reader = GeoTiffReader::open(path)?;
    let info = reader.info().clone();
    let window = PixelWindow::new(0, 0, info.width, info.height);
    let data = reader.read_window(window, nodata)?;
    HazardRaster::new(
        info.width,
        info.height,
        data,
        info.transform,
        info.epsg.unwrap_or(default_epsg),
        nodata,
    )
}

/// Writes a raster as a 32-bit float GeoTIFF, creating parent directories
///
/// # Errors
///
/// Returns `Validation` for a zero-area raster, which TIFF cannot represent.
pub fn write_raster(path: &Path, raster: &HazardRaster) -> Result<()> {
    write_raster_as(path, raster, RASTER_PIXEL_IS_AREA)
}

fn write_raster_as(path: &Path, raster: &HazardRaster, raster_type: u16) -> Result<()> {
    if raster.width() == 0 || raster.height() == 0 {
        return Err(FloodlineError::Validation(format!(
            "Refusing to write zero-area raster to {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    {
        let mut encoder = TiffEncoder::new(&mut writer)?;
        let mut image = encoder
            .new_image::<colortype::Gray32Float>(raster.width() as u32, raster.height() as u32)?;

        let t = raster.transform();
        let dir = image.encoder();
        if t.is_rectilinear() {
            let scale = [t.a, -t.e, 0.0];
            let tiepoint = [0.0, 0.0, 0.0, t.c, t.f, 0.0];
            dir.write_tag(geo_tag(MODEL_PIXEL_SCALE), &scale[..])?;
            dir.write_tag(geo_tag(MODEL_TIEPOINT), &tiepoint[..])?;
        } else {
            let matrix = [
                t.a, t.b, 0.0, t.c, //
                t.d, t.e, 0.0, t.f, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ];
            dir.write_tag(geo_tag(MODEL_TRANSFORMATION), &matrix[..])?;
        }
        let keys = geo_key_directory(raster.epsg(), raster_type);
        dir.write_tag(geo_tag(GEO_KEY_DIRECTORY), &keys[..])?;
        let nodata = format_nodata(raster.nodata());
        dir.write_tag(geo_tag(GDAL_NODATA), nodata.as_str())?;

        image.write_data(raster.data())?;
    }
    writer.flush()?;
    Ok(())
}

fn read_transform(decoder: &mut Decoder<BufReader<File>>) -> Option<Affine> {
    let matrix = decoder
        .find_tag(geo_tag(MODEL_TRANSFORMATION))
        .ok()
        .flatten()
        .and_then(|v| v.into_f64_vec().ok());
    if let Some(m) = matrix.filter(|m| m.len() >= 8) {
        return Some(Affine::new(m[0], m[1], m[3], m[4], m[5], m[7]));
    }

    let scale = decoder
        .find_tag(geo_tag(MODEL_PIXEL_SCALE))
        .ok()
        .flatten()
        .and_then(|v| v.into_f64_vec().ok())?;
    let tiepoint = decoder
        .find_tag(geo_tag(MODEL_TIEPOINT))
        .ok()
        .flatten()
        .and_then(|v| v.into_f64_vec().ok())?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }
    let (sx, sy) = (scale[0], scale[1]);
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    Some(Affine::new(sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy))
}

/// Inline GeoKeys as `(key, value)`; keys stored in other tags are dropped
fn read_geo_keys(decoder: &mut Decoder<BufReader<File>>) -> Vec<(u32, u32)> {
    let Some(keys) = decoder
        .find_tag(geo_tag(GEO_KEY_DIRECTORY))
        .ok()
        .flatten()
        .and_then(|v| v.into_u32_vec().ok())
    else {
        return Vec::new();
    };
    // Header is 4 shorts, then (key, location, count, value) quadruples
    keys.get(4..)
        .unwrap_or_default()
        .chunks_exact(4)
        .filter(|entry| entry[1] == 0)
        .map(|entry| (entry[0], entry[3]))
        .collect()
}

fn key_value(keys: &[(u32, u32)], key: u32) -> Option<u32> {
    keys.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Moves a transform anchored on the first pixel's centre to its corner
fn point_to_area(t: Affine) -> Affine {
    Affine::new(
        t.a,
        t.b,
        t.c - 0.5 * (t.a + t.b),
        t.d,
        t.e,
        t.f - 0.5 * (t.d + t.e),
    )
}

fn geo_key_directory(epsg: u16, raster_type: u16) -> Vec<u16> {
    let geographic = (4000..5000).contains(&epsg);
    let (model_type, crs_key) = if geographic {
        (2, GEOGRAPHIC_TYPE_KEY)
    } else {
        (1, PROJECTED_CS_TYPE_KEY)
    };
    vec![
        1, 1, 0, 3, //
        GT_MODEL_TYPE_KEY as u16, 0, 1, model_type, //
        GT_RASTER_TYPE_KEY as u16, 0, 1, raster_type, //
        crs_key as u16, 0, 1, epsg,
    ]
}

fn format_nodata(nodata: f32) -> String {
    if nodata.fract() == 0.0 {
        format!("{}", nodata as i64)
    } else {
        nodata.to_string()
    }
}

fn to_f32(result: DecodingResult) -> Result<Vec<f32>> {
    Ok(match result {
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        _ => {
            return Err(FloodlineError::MalformedRaster(
                "Unsupported 64-bit integer sample format".to_string(),
            ))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_raster() -> HazardRaster {
        let t = Affine::from_origin(30.0, 2.0, 0.5, 0.5);
        let data = vec![
            1.0, 2.0, 255.0, //
            0.0, 3.5, 4.0,
        ];
        HazardRaster::new(3, 2, data, t, 4326, 255.0).unwrap()
    }

    #[test]
    fn test_write_then_read_preserves_georeferencing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("KEN.1_1.tif");
        let raster = sample_raster();

        write_raster(&path, &raster).unwrap();
        let read = read_raster(&path, 255.0, 4326).unwrap();

        assert_eq!(read.width(), 3);
        assert_eq!(read.height(), 2);
        assert_eq!(read.data(), raster.data());
        assert_eq!(read.transform(), raster.transform());
        assert_eq!(read.epsg(), 4326);
    }

    #[test]
    fn test_header_carries_nodata_and_epsg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.tif");
        write_raster(&path, &sample_raster()).unwrap();

        let reader = GeoTiffReader::open(&path).unwrap();
        assert_eq!(reader.info().nodata, Some(255.0));
        assert_eq!(reader.info().epsg, Some(4326));
    }

    #[test]
    fn test_pixel_is_point_shifts_to_corner() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("point.tif");
        write_raster_as(&path, &sample_raster(), RASTER_PIXEL_IS_POINT).unwrap();

        let reader = GeoTiffReader::open(&path).unwrap();
        let t = reader.info().transform;
        assert_eq!((t.c, t.f), (29.75, 2.25));
        assert_eq!((t.a, t.e), (0.5, -0.5));
        // The tiepoint now sits on the first cell's centre
        assert_eq!(t.apply(0.5, 0.5), (30.0, 2.0));
        assert_eq!(reader.info().epsg, Some(4326));
    }

    #[test]
    fn test_read_window_clamps_and_fills() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.tif");
        write_raster(&path, &sample_raster()).unwrap();

        let mut reader = GeoTiffReader::open(&path).unwrap();
        let values = reader.read_window(PixelWindow::new(1, 1, 3, 2), -1.0).unwrap();
        assert_eq!(values, vec![3.5, 4.0, -1.0, -1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_missing_file_is_data_not_found() {
        let err = GeoTiffReader::open(Path::new("/nonexistent/hazard.tif")).err().unwrap();
        assert!(matches!(err, FloodlineError::DataNotFound(_)));
    }

    #[test]
    fn test_corrupt_file_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.tif");
        std::fs::write(&path, b"not a tiff at all").unwrap();
        let err = GeoTiffReader::open(&path).err().unwrap();
        assert!(matches!(err, FloodlineError::MalformedRaster(_)));
    }

    #[test]
    fn test_zero_area_raster_is_not_written() {
        let dir = TempDir::new().unwrap();
        let raster = HazardRaster::empty(Affine::from_origin(0.0, 0.0, 1.0, 1.0), 4326, 255.0);
        assert!(write_raster(&dir.path().join("empty.tif"), &raster).is_err());
    }

    #[test]
    fn test_format_nodata() {
        assert_eq!(format_nodata(255.0), "255");
        assert_eq!(format_nodata(-9999.0), "-9999");
        assert_eq!(format_nodata(0.5), "0.5");
    }
}
